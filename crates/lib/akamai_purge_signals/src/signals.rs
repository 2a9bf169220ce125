use crate::{PurgeSubject, PurgeTaskQueue, QueueError, SubjectError, TaskId};
use akamai_purge_ccu::{Ccu, CcuBehaviour as _, IncompletePurge, PurgeOutcome};
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error(transparent)]
    Subject(#[from] SubjectError),

    #[error(transparent)]
    Purge(#[from] IncompletePurge),

    #[error("no background task queue configured, can't queue purge requests")]
    TasksUnavailable,

    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// Entry point for application code that wants content purged.
///
/// ```text,ignore
/// let signals = PurgeSignals::new(ccu).with_task_queue(queue);
///
/// // purge right away
/// signals.purge_request(PurgeSubject::object(&article)).await?;
///
/// // or let the background worker do it
/// if signals.tasks_available() {
///     signals.queue_purge_request(PurgeSubject::objects(&articles))?;
/// }
/// ```
pub struct PurgeSignals {
    ccu: Arc<Ccu>,
    queue: Option<Arc<dyn PurgeTaskQueue>>,
}

impl PurgeSignals {
    pub fn new(ccu: Arc<Ccu>) -> Self {
        Self { ccu, queue: None }
    }

    pub fn with_task_queue(mut self, queue: Arc<dyn PurgeTaskQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    /// whether [`Self::queue_purge_request`] can be used.
    pub fn tasks_available(&self) -> bool {
        self.queue.is_some()
    }

    /// Purge the subject's URLs and wait for the API to accept them.
    #[instrument(skip(self))]
    pub async fn purge_request(
        &self,
        subject: PurgeSubject<'_>,
    ) -> Result<Vec<PurgeOutcome>, SignalError> {
        let urls = subject.into_urls()?;
        debug!(urls = urls.len(), "purging directly");
        Ok(self.ccu.purge_urls(urls).await?)
    }

    /// Hand the subject's URLs to the background task queue.
    #[instrument(skip(self))]
    pub fn queue_purge_request(&self, subject: PurgeSubject<'_>) -> Result<TaskId, SignalError> {
        let queue = self.queue.as_ref().ok_or(SignalError::TasksUnavailable)?;
        let urls = subject.into_urls()?;

        let task_id = queue.delay(urls)?;
        debug!(%task_id, "queued purge request");
        Ok(task_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BackgroundPurgeQueue, Config, subject::tests::{Article, article}};
    use akamai_purge_ccu::{Config as CcuConfig, PurgeError};
    use akamai_purge_config::AppConfig as _;
    use akamai_purge_opentelemetry::testing::TestMetrics;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// records what would have been queued.
    #[derive(Default)]
    struct RecordingQueue {
        delayed: Mutex<Vec<Vec<String>>>,
    }

    impl PurgeTaskQueue for RecordingQueue {
        fn delay(&self, urls: Vec<String>) -> Result<TaskId, QueueError> {
            let mut delayed = self.delayed.lock().unwrap();
            delayed.push(urls);
            Ok(TaskId(delayed.len() as u64))
        }
    }

    #[tokio::test]
    async fn test_purge_request_with_three_objects() -> anyhow::Result<()> {
        let ccu = Arc::new(Ccu::mock());
        let signals = PurgeSignals::new(ccu.clone());

        let articles = vec![article("one"), article("two"), article("three")];
        let outcomes = signals
            .purge_request(PurgeSubject::objects(&articles))
            .await?;

        assert_eq!(outcomes.len(), 1);
        assert_eq!(
            ccu.purged_urls().await?,
            vec![
                "https://www.example.com/articles/one.html",
                "https://www.example.com/articles/two.html",
                "https://www.example.com/articles/three.html",
            ]
        );
        assert_eq!(ccu.purge_calls().await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_purge_request_with_url() -> anyhow::Result<()> {
        let ccu = Arc::new(Ccu::mock());
        let signals = PurgeSignals::new(ccu.clone());

        signals
            .purge_request("https://www.example.com/".into())
            .await?;

        assert_eq!(ccu.purged_urls().await?, vec!["https://www.example.com/"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_subject_purges_nothing() -> anyhow::Result<()> {
        let ccu = Arc::new(Ccu::mock());
        let queue = Arc::new(RecordingQueue::default());
        let signals = PurgeSignals::new(ccu.clone()).with_task_queue(queue.clone());

        let articles = vec![article("one"), Article { slug: None }];
        assert!(matches!(
            signals.purge_request(PurgeSubject::objects(&articles)).await,
            Err(SignalError::Subject(SubjectError::MissingCanonicalUrl { position: 1 }))
        ));
        assert!(matches!(
            signals.queue_purge_request(PurgeSubject::objects(&articles)),
            Err(SignalError::Subject(_))
        ));

        assert_eq!(ccu.purge_calls().await?, 0);
        assert!(queue.delayed.lock().unwrap().is_empty());
        Ok(())
    }

    #[test]
    fn test_queue_without_task_queue() {
        let signals = PurgeSignals::new(Arc::new(Ccu::mock()));

        assert!(!signals.tasks_available());
        assert!(matches!(
            signals.queue_purge_request("https://www.example.com/".into()),
            Err(SignalError::TasksUnavailable)
        ));
    }

    #[test]
    fn test_queue_purge_request_delays_urls() -> anyhow::Result<()> {
        let queue = Arc::new(RecordingQueue::default());
        let signals = PurgeSignals::new(Arc::new(Ccu::mock())).with_task_queue(queue.clone());
        assert!(signals.tasks_available());

        signals.queue_purge_request(vec!["https://a.example.com/", "https://b.example.com/"].into())?;
        signals.queue_purge_request(PurgeSubject::object(article("one")))?;

        assert_eq!(
            *queue.delayed.lock().unwrap(),
            vec![
                vec!["https://a.example.com/".to_string(), "https://b.example.com/".to_string()],
                vec!["https://www.example.com/articles/one.html".to_string()],
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_queue_purge_request_through_background_queue() -> anyhow::Result<()> {
        let metrics = TestMetrics::new();
        let ccu = Arc::new(Ccu::mock());
        let queue = Arc::new(BackgroundPurgeQueue::start(
            ccu.clone(),
            Config::test_config()?,
            metrics.provider(),
        ));
        let signals = PurgeSignals::new(ccu.clone()).with_task_queue(queue.clone());

        let articles = vec![article("one"), article("two"), article("three")];
        signals.queue_purge_request(PurgeSubject::objects(&articles))?;
        queue.shutdown().await?;

        assert_eq!(ccu.purged_urls().await?.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_credentials_surface_as_purge_error() -> anyhow::Result<()> {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let metrics = TestMetrics::new();
        let config = CcuConfig {
            api_base: Some(server.url().parse()?),
            edgerc_path: "/nonexistent/.edgerc".into(),
            ..CcuConfig::default()
        };

        assert!(matches!(
            Ccu::from_config(&config, metrics.provider()),
            Err(PurgeError::MissingCredentials { .. })
        ));

        m.assert_async().await;
        Ok(())
    }
}
