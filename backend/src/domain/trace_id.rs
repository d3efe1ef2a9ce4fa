//! Correlation id shared by the logs, error bodies and emails of one request.
//!
//! The id lives in task-local storage. Spawned tasks do not inherit it, so
//! work that outlives the handler (notification delivery) goes through
//! [`TraceId::spawn`].

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task::JoinHandle;
use tokio::task_local;
use uuid::Uuid;

task_local! {
    static CURRENT: TraceId;
}

/// Identifier of the HTTP request currently being served.
///
/// # Examples
/// ```
/// use approvals::TraceId;
///
/// fn log_decision() {
///     match TraceId::current() {
///         Some(id) => tracing::info!(trace_id = %id, "request decided"),
///         None => tracing::info!("request decided outside a request"),
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Fresh random id for an incoming request.
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Id of the enclosing request, if any.
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` as the current id.
    ///
    /// # Examples
    /// ```
    /// use approvals::TraceId;
    /// use uuid::Uuid;
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let id = TraceId::from_uuid(Uuid::nil());
    /// assert_eq!(TraceId::scope(id, async { TraceId::current() }).await, Some(id));
    /// # });
    /// ```
    pub async fn scope<Fut>(trace_id: Self, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        CURRENT.scope(trace_id, fut).await
    }

    /// Spawn `fut` on the runtime, keeping the caller's id in scope.
    pub fn spawn<Fut>(fut: Fut) -> JoinHandle<Fut::Output>
    where
        Fut: Future + Send + 'static,
        Fut::Output: Send + 'static,
    {
        match Self::current() {
            Some(trace_id) => tokio::spawn(CURRENT.scope(trace_id, fut)),
            None => tokio::spawn(fut),
        }
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn no_id_outside_a_request() {
        assert_eq!(TraceId::current(), None);
    }

    #[rstest]
    #[tokio::test]
    async fn spawned_work_keeps_the_request_id() {
        let id = TraceId::generate();
        let seen = TraceId::scope(id, async {
            TraceId::spawn(async { TraceId::current() })
                .await
                .expect("task completes")
        })
        .await;
        assert_eq!(seen, Some(id));
    }

    #[rstest]
    #[tokio::test]
    async fn spawn_without_request_has_no_id() {
        let seen = TraceId::spawn(async { TraceId::current() })
            .await
            .expect("task completes");
        assert_eq!(seen, None);
    }

    #[rstest]
    #[case("3fa85f64-5717-4562-b3fc-2c963f66afa6", true)]
    #[case("not-a-trace", false)]
    fn parses_only_uuids(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(raw.parse::<TraceId>().is_ok(), valid);
    }
}
