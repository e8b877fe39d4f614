use crate::wire::HealthRes;

/// Health check shared by every BioTrack entry point.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Reports the service as alive.
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "BioTrack is alive".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_healthy() {
        let res = HealthService::check_health();
        assert!(res.ok);
        assert!(res.message.contains("alive"));
    }
}
