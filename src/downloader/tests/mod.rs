//! Tests for the ChannelDownloader façade.

use crate::error::{DownloadError, Error, ResolutionError};
use crate::remote::Message;
use crate::types::JobStatus;

use super::test_helpers::{
    CHANNEL_ID, channel_entity, create_sqlite_downloader, create_test_downloader, remote_with, session,
    three_documents, wait_for_terminal,
};

mod jobs;
mod selective;
