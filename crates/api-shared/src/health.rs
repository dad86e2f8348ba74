use crate::HealthRes;

/// Simple health service shared by every API surface.
///
/// Reports liveness only; it does not probe the oracle or the store.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Check health without creating an instance.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "MediWhisper is alive".into(),
        }
    }
}
