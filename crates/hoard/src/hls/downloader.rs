// HLS segment downloader: writes every referenced resource into the session
// directory, one file per resource.

use std::path::Path;

use futures::StreamExt;
use reqwest::header::HeaderMap;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, debug_span};

use crate::DownloadError;
use crate::hls::retry::{RetryPolicy, retry_with_backoff};
use crate::hls::segment::{InitSegment, Segment};
use crate::hls::transport::Transport;

pub struct SegmentDownloader<'a> {
    transport: &'a dyn Transport,
    headers: &'a HeaderMap,
    directory: &'a Path,
    concurrency: usize,
    retry: &'a RetryPolicy,
    token: &'a CancellationToken,
}

impl<'a> SegmentDownloader<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        headers: &'a HeaderMap,
        directory: &'a Path,
        retry: &'a RetryPolicy,
        token: &'a CancellationToken,
    ) -> Self {
        Self {
            transport,
            headers,
            directory,
            concurrency: 1,
            retry,
            token,
        }
    }

    /// Number of downloads allowed in flight at once (at least 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    async fn fetch(&self, url: &str, file_name: &str) -> Result<u64, DownloadError> {
        let destination = self.directory.join(file_name);
        let bytes = retry_with_backoff(self.retry, self.token, |_| {
            self.transport
                .download_binary(url, &destination, self.headers)
        })
        .await?;
        debug!(url, file = file_name, bytes, "Downloaded");
        Ok(bytes)
    }

    /// Download init segments one after another; returns the bytes written.
    pub async fn download_init_segments(
        &self,
        init_segments: &[InitSegment],
    ) -> Result<u64, DownloadError> {
        let mut total_bytes = 0;
        for init in init_segments {
            if self.token.is_cancelled() {
                return Err(DownloadError::Cancelled);
            }
            total_bytes += self
                .fetch(&init.url, &init.file_name)
                .instrument(debug_span!("init_segment", file = %init.file_name))
                .await?;
        }
        Ok(total_bytes)
    }

    /// Download `segments` with at most `concurrency` requests in flight.
    ///
    /// File names come from each segment's manifest index, so completion order
    /// never affects naming. `on_complete(completed, bytes)` runs on this task once
    /// per finished segment, so `completed` increases by one on every call. The
    /// first failure aborts the remaining downloads.
    pub async fn download_segments<F>(
        &self,
        segments: &[Segment],
        mut on_complete: F,
    ) -> Result<u64, DownloadError>
    where
        F: FnMut(usize, u64),
    {
        let mut pending = futures::stream::iter(segments)
            .map(|segment| async move {
                let file_name = segment.file_name();
                self.fetch(&segment.url, &file_name)
                    .instrument(debug_span!("segment", index = segment.index))
                    .await
            })
            .buffer_unordered(self.concurrency);

        let mut completed = 0usize;
        let mut total_bytes = 0u64;

        loop {
            let next = tokio::select! {
                biased;
                _ = self.token.cancelled() => return Err(DownloadError::Cancelled),
                next = pending.next() => next,
            };
            let Some(result) = next else {
                break;
            };

            let bytes = result?;
            completed += 1;
            total_bytes += bytes;
            on_complete(completed, bytes);
        }

        Ok(total_bytes)
    }
}
