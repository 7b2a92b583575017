use async_trait::async_trait;
use serde::Serialize;

/// Credentials handed to the delivery channel for one office admin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CredentialDelivery {
    pub office_name: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password: String,
}

/// Outbound channel for generated credentials. Reports whether delivery worked;
/// callers never retry.
#[async_trait]
pub trait CredentialNotifier: Send + Sync {
    async fn send_credentials(&self, delivery: &CredentialDelivery) -> bool;
}

/// Used when no delivery channel is configured: every send fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl CredentialNotifier for DisabledNotifier {
    async fn send_credentials(&self, _delivery: &CredentialDelivery) -> bool { false }
}

/// Recording notifier for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct RecordingNotifier {
        fail: bool,
        sent: Mutex<Vec<CredentialDelivery>>,
    }

    impl RecordingNotifier {
        pub fn failing() -> Self { Self { fail: true, ..Default::default() } }

        pub fn sent(&self) -> Vec<CredentialDelivery> { self.sent.lock().unwrap().clone() }
    }

    #[async_trait]
    impl CredentialNotifier for RecordingNotifier {
        async fn send_credentials(&self, delivery: &CredentialDelivery) -> bool {
            if self.fail { return false; }
            self.sent.lock().unwrap().push(delivery.clone());
            true
        }
    }
}
