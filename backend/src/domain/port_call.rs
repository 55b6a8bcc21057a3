//! Error-level reporting for failed driven-port calls.
//!
//! Services tag each port call with the operation, the acting user and the
//! entity it touches. Infrastructure failures (`internal_error` and
//! `service_unavailable`) are logged at `error!` with that context before
//! they propagate; client-facing failures such as `not_found` pass through
//! silently.

use tracing::error;

use super::{Actor, ClaimId, Error, ErrorCode, ServiceRequestId, TechnicianId, UserId};

/// Context attached to a driven-port call.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PortCall {
    operation: &'static str,
    actor_id: Option<i64>,
    request_id: Option<i64>,
    claim_id: Option<i64>,
    technician_id: Option<i64>,
}

impl PortCall {
    pub(crate) const fn new(operation: &'static str) -> Self {
        Self {
            operation,
            actor_id: None,
            request_id: None,
            claim_id: None,
            technician_id: None,
        }
    }

    pub(crate) fn by(self, actor: &Actor) -> Self {
        self.by_user(actor.user_id())
    }

    pub(crate) fn by_user(mut self, id: UserId) -> Self {
        self.actor_id = Some(id.get());
        self
    }

    pub(crate) fn request(mut self, id: ServiceRequestId) -> Self {
        self.request_id = Some(id.get());
        self
    }

    pub(crate) fn claim(mut self, id: ClaimId) -> Self {
        self.claim_id = Some(id.get());
        self
    }

    pub(crate) fn technician(mut self, id: TechnicianId) -> Self {
        self.technician_id = Some(id.get());
        self
    }

    /// Log `err` when it is an infrastructure failure, then hand it back.
    pub(crate) fn report(&self, err: Error) -> Error {
        if matches!(
            err.code(),
            ErrorCode::InternalError | ErrorCode::ServiceUnavailable
        ) {
            error!(
                operation = self.operation,
                actor_id = self.actor_id,
                request_id = self.request_id,
                claim_id = self.claim_id,
                technician_id = self.technician_id,
                code = ?err.code(),
                error = err.message(),
                "driven port call failed"
            );
        }
        err
    }
}

/// Route a port result's error through [`PortCall::report`].
pub(crate) trait Reported<T> {
    fn reported(self, call: &PortCall) -> Result<T, Error>;
}

impl<T, E> Reported<T> for Result<T, E>
where
    E: Into<Error>,
{
    fn reported(self, call: &PortCall) -> Result<T, Error> {
        self.map_err(|err| call.report(err.into()))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::domain::ports::ServiceRequestRepositoryError;
    use rstest::rstest;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            let bytes = self.0.lock().expect("log buffer").clone();
            String::from_utf8(bytes).expect("utf-8 log output")
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("log buffer").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture(f: impl FnOnce()) -> String {
        let sink = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_writer(sink.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        sink.text()
    }

    fn call() -> PortCall {
        PortCall::new("assign_service_request")
            .by(&Actor::user(UserId::new(7)))
            .request(ServiceRequestId::new(42))
    }

    #[rstest]
    fn infrastructure_failures_are_logged_with_context() {
        let output = capture(|| {
            let result: Result<(), _> =
                Err(ServiceRequestRepositoryError::connection("pool timed out"));
            let err = result.reported(&call()).expect_err("error passes through");
            assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
        });
        assert!(output.contains("\"level\":\"ERROR\""), "{output}");
        assert!(output.contains("\"operation\":\"assign_service_request\""), "{output}");
        assert!(output.contains("\"actor_id\":7"), "{output}");
        assert!(output.contains("\"request_id\":42"), "{output}");
        assert!(!output.contains("claim_id"), "{output}");
    }

    #[rstest]
    #[case(Error::not_found("service request 42 not found"))]
    #[case(Error::conflict("taken"))]
    #[case(Error::forbidden("nope"))]
    fn client_failures_are_not_logged(#[case] err: Error) {
        let output = capture(|| {
            let returned = call().report(err.clone());
            assert_eq!(returned, err);
        });
        assert!(output.is_empty(), "{output}");
    }
}
