//! Sequential relay loop for a single job.

use super::{render, ExecutorConfig, Job, JobCounters, JobOutcome, JobReport};
use crate::error::JobError;
use crate::platform::{ChannelClient, JobTransport, PostedMessage, SourceMessage};
use futures_util::StreamExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Walks a source channel's history and relays each message to the destination.
pub struct ForwardExecutor {
    client: Arc<dyn ChannelClient>,
    transport: Arc<dyn JobTransport>,
    config: ExecutorConfig,
}

impl ForwardExecutor {
    /// Create an executor bound to a platform client and a status chat.
    #[must_use]
    pub fn new(
        client: Arc<dyn ChannelClient>,
        transport: Arc<dyn JobTransport>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            client,
            transport,
            config,
        }
    }

    /// Run `job` to completion, stop, or failure.
    ///
    /// `cancel` is polled once per message, before the message is relayed;
    /// a message already in flight (including its trailing delay) always
    /// finishes.
    pub async fn run(&self, job: &Job, cancel: &CancellationToken) -> JobReport {
        if let Err(e) = self.transport.send_reply(&render::launch_ack()).await {
            warn!(job_id = %job.id, error = %e, "Failed to acknowledge job start");
        }

        let mut counters = JobCounters::default();
        let outcome = match self.relay(job, cancel, &mut counters).await {
            Ok((status, outcome)) => {
                self.finish(job, status, &counters, &outcome).await;
                outcome
            }
            Err(e) => {
                error!(job_id = %job.id, error = %e, forwarded = counters.forwarded, "Forwarding failed");
                if let Err(send_err) = self.transport.send_reply(&render::failure(job, &e)).await {
                    warn!(job_id = %job.id, error = %send_err, "Failed to report job failure");
                }
                JobOutcome::Failed(e)
            }
        };

        JobReport {
            id: job.id,
            counters,
            outcome,
        }
    }

    async fn relay(
        &self,
        job: &Job,
        cancel: &CancellationToken,
        counters: &mut JobCounters,
    ) -> Result<(PostedMessage, JobOutcome), JobError> {
        let status = self
            .transport
            .send_reply(&render::started(job))
            .await
            .map_err(JobError::Status)?;

        info!(
            job_id = %job.id,
            source = %job.source,
            destination = %job.destination,
            limit = ?job.limit,
            mode = ?job.mode(),
            "Forwarding started"
        );

        let history = self
            .client
            .iterate_history(&job.source, job.limit)
            .await
            .map_err(JobError::History)?;
        let mut history = match job.limit {
            Some(limit) => history.take(limit).boxed(),
            None => history,
        };
        let progress_every = self.config.progress_every.max(1);

        while let Some(item) = history.next().await {
            let message = item.map_err(JobError::History)?;
            if cancel.is_cancelled() {
                info!(job_id = %job.id, forwarded = counters.forwarded, "Forwarding stopped by request");
                return Ok((status, JobOutcome::Stopped));
            }

            self.relay_one(job, &message, counters).await;
            counters.forwarded += 1;

            if counters.forwarded % progress_every == 0 {
                if let Err(e) = self
                    .transport
                    .edit_message(status, &render::progress(job, counters))
                    .await
                {
                    warn!(job_id = %job.id, error = %e, "Failed to update progress message");
                }
                info!(
                    job_id = %job.id,
                    forwarded = counters.forwarded,
                    edited = counters.edited,
                    failed = counters.failed,
                    "Forwarding progress"
                );
            }

            tokio::time::sleep(self.config.relay_delay).await;
        }

        Ok((status, JobOutcome::Exhausted))
    }

    async fn relay_one(&self, job: &Job, message: &SourceMessage, counters: &mut JobCounters) {
        let rewritten = job
            .caption_edit
            .as_ref()
            .and_then(|edit| edit.apply(message.caption.as_deref()));

        let result = match rewritten {
            Some(caption) => self
                .client
                .copy(message, &job.destination, &caption)
                .await
                .map(|_| true),
            None => self
                .client
                .forward(message, &job.destination)
                .await
                .map(|()| false),
        };

        match result {
            Ok(true) => counters.edited += 1,
            Ok(false) => {}
            Err(e) => {
                counters.failed += 1;
                error!(job_id = %job.id, message_id = message.id, error = %e, "Failed to relay message");
            }
        }
    }

    async fn finish(
        &self,
        job: &Job,
        status: PostedMessage,
        counters: &JobCounters,
        outcome: &JobOutcome,
    ) {
        if let Err(e) = self
            .transport
            .edit_message(status, &render::summary(job, counters, outcome))
            .await
        {
            warn!(job_id = %job.id, error = %e, "Failed to write job summary");
        }
        if let Err(e) = self
            .transport
            .send_reply(&render::completion_ack(outcome))
            .await
        {
            warn!(job_id = %job.id, error = %e, "Failed to send completion notice");
        }
        info!(
            job_id = %job.id,
            forwarded = counters.forwarded,
            edited = counters.edited,
            failed = counters.failed,
            ?outcome,
            "Forwarding finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::CaptionEdit;
    use crate::error::PlatformError;
    use crate::job::JobId;
    use crate::platform::{MockChannelClient, MockJobTransport};
    use crate::testing::{history_of, mock_transport_noop, source_message};
    use std::time::Duration;

    fn config() -> ExecutorConfig {
        ExecutorConfig {
            relay_delay: Duration::from_millis(300),
            progress_every: 20,
        }
    }

    fn job(edit: Option<CaptionEdit>, limit: Option<usize>) -> Job {
        Job {
            id: JobId(1),
            source: "a".to_string(),
            destination: "@b".to_string(),
            caption_edit: edit,
            limit,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn simple_mode_forwards_everything() {
        let messages: Vec<_> = (1..=45).map(|id| source_message(id, None)).collect();
        let mut client = MockChannelClient::new();
        client
            .expect_iterate_history()
            .returning(move |_, _| Ok(history_of(messages.clone())));
        client.expect_forward().times(45).returning(|_, _| Ok(()));
        client.expect_copy().never();

        let mut transport = MockJobTransport::new();
        transport
            .expect_send_reply()
            .returning(|_| Ok(PostedMessage(100)));
        // two progress edits (20, 40) plus the summary
        transport
            .expect_edit_message()
            .times(3)
            .returning(|_, _| Ok(()));

        let executor = ForwardExecutor::new(Arc::new(client), Arc::new(transport), config());
        let report = executor
            .run(&job(None, None), &CancellationToken::new())
            .await;

        assert_eq!(report.outcome, JobOutcome::Exhausted);
        assert_eq!(report.counters.forwarded, 45);
        assert_eq!(report.counters.edited, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn edit_mode_copies_only_matching_captions() {
        let messages = vec![
            source_message(1, Some("big promo today")),
            source_message(2, Some("plain caption")),
            source_message(3, None),
            source_message(4, Some("promo")),
        ];
        let mut client = MockChannelClient::new();
        client
            .expect_iterate_history()
            .returning(move |_, _| Ok(history_of(messages.clone())));
        client
            .expect_copy()
            .withf(|message, destination, caption| {
                destination == "@b" && !caption.contains("promo") && message.id % 3 == 1
            })
            .times(2)
            .returning(|message, _, _| Ok(message.id + 1000));
        client.expect_forward().times(2).returning(|_, _| Ok(()));

        let edit = CaptionEdit {
            find_text: "promo".to_string(),
            replace_text: String::new(),
        };
        let executor = ForwardExecutor::new(
            Arc::new(client),
            Arc::new(mock_transport_noop()),
            config(),
        );
        let report = executor
            .run(&job(Some(edit), None), &CancellationToken::new())
            .await;

        assert_eq!(report.counters.forwarded, 4);
        assert_eq!(report.counters.edited, 2);
        assert!(report.counters.edited <= report.counters.forwarded);
    }

    #[tokio::test(start_paused = true)]
    async fn relay_failures_are_counted_and_skipped() {
        let messages: Vec<_> = (1..=5).map(|id| source_message(id, None)).collect();
        let mut client = MockChannelClient::new();
        client
            .expect_iterate_history()
            .returning(move |_, _| Ok(history_of(messages.clone())));
        client.expect_forward().times(5).returning(|message, _| {
            if message.id % 2 == 0 {
                Err(PlatformError::Api("CHAT_FORWARDS_RESTRICTED".to_string()))
            } else {
                Ok(())
            }
        });

        let executor = ForwardExecutor::new(
            Arc::new(client),
            Arc::new(mock_transport_noop()),
            config(),
        );
        let report = executor
            .run(&job(None, None), &CancellationToken::new())
            .await;

        assert_eq!(report.outcome, JobOutcome::Exhausted);
        assert_eq!(report.counters.forwarded, 5);
        assert_eq!(report.counters.failed, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn limit_bounds_the_stream() {
        let messages: Vec<_> = (1..=30).map(|id| source_message(id, None)).collect();
        let mut client = MockChannelClient::new();
        client
            .expect_iterate_history()
            .withf(|channel, limit| channel == "a" && *limit == Some(10))
            .returning(move |_, _| Ok(history_of(messages.clone())));
        client.expect_forward().times(10).returning(|_, _| Ok(()));

        let executor = ForwardExecutor::new(
            Arc::new(client),
            Arc::new(mock_transport_noop()),
            config(),
        );
        let report = executor
            .run(&job(None, Some(10)), &CancellationToken::new())
            .await;

        assert_eq!(report.counters.forwarded, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_token_stops_before_first_message() {
        let messages: Vec<_> = (1..=3).map(|id| source_message(id, None)).collect();
        let mut client = MockChannelClient::new();
        client
            .expect_iterate_history()
            .returning(move |_, _| Ok(history_of(messages.clone())));
        client.expect_forward().never();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let executor = ForwardExecutor::new(
            Arc::new(client),
            Arc::new(mock_transport_noop()),
            config(),
        );
        let report = executor.run(&job(None, None), &cancel).await;

        assert_eq!(report.outcome, JobOutcome::Stopped);
        assert_eq!(report.counters.forwarded, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn history_error_fails_the_job() {
        let mut client = MockChannelClient::new();
        client
            .expect_iterate_history()
            .returning(|channel, _| Err(PlatformError::NotFound(channel.to_string())));

        let mut transport = MockJobTransport::new();
        transport
            .expect_send_reply()
            .returning(|_| Ok(PostedMessage(1)));
        transport.expect_edit_message().never();

        let executor = ForwardExecutor::new(Arc::new(client), Arc::new(transport), config());
        let report = executor
            .run(&job(None, None), &CancellationToken::new())
            .await;

        assert_eq!(
            report.outcome,
            JobOutcome::Failed(JobError::History(PlatformError::NotFound("a".to_string())))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn history_error_mid_stream_fails_the_job() {
        let mut client = MockChannelClient::new();
        client.expect_iterate_history().returning(|_, _| {
            let items = vec![
                Ok(source_message(1, None)),
                Ok(source_message(2, None)),
                Err(PlatformError::Network("connection reset".to_string())),
                Ok(source_message(3, None)),
            ];
            Ok(futures_util::stream::iter(items).boxed())
        });
        client.expect_forward().times(2).returning(|_, _| Ok(()));

        let mut transport = MockJobTransport::new();
        transport
            .expect_send_reply()
            .withf(|text| text.contains("Starting") || text.contains("Started"))
            .times(2)
            .returning(|_| Ok(PostedMessage(1)));
        transport
            .expect_send_reply()
            .withf(|text| text.contains("connection reset"))
            .times(1)
            .returning(|_| Ok(PostedMessage(2)));
        transport.expect_edit_message().never();

        let executor = ForwardExecutor::new(Arc::new(client), Arc::new(transport), config());
        let report = executor
            .run(&job(None, None), &CancellationToken::new())
            .await;

        assert!(matches!(
            report.outcome,
            JobOutcome::Failed(JobError::History(PlatformError::Network(_)))
        ));
        assert_eq!(report.counters.forwarded, 2);
        assert_eq!(report.counters.failed, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn status_failure_fails_the_job_without_reading_history() {
        let mut client = MockChannelClient::new();
        client.expect_iterate_history().never();

        let mut transport = MockJobTransport::new();
        transport.expect_send_reply().returning(|text| {
            if text.contains("Started") {
                Err(PlatformError::Network("timeout".to_string()))
            } else {
                Ok(PostedMessage(1))
            }
        });

        let executor = ForwardExecutor::new(Arc::new(client), Arc::new(transport), config());
        let report = executor
            .run(&job(None, None), &CancellationToken::new())
            .await;

        assert!(matches!(
            report.outcome,
            JobOutcome::Failed(JobError::Status(_))
        ));
    }
}
