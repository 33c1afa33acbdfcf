use tracing::{error, info, warn};

use super::error::{SecretSantaError, SecretSantaResult};
use crate::{
    models::secret_santa::{ShuffleContext, ShuffleReport, ShuffleSummary, ShuffleVariant},
    services::metrics::{MATCH_ATTEMPTS, SHUFFLES_COUNTER},
};

/// Log and count the outcome of a draw, then reduce it to what callers see.
/// The attempt count stays in the logs and metrics.
pub fn report(
    ctx: &ShuffleContext,
    variant: ShuffleVariant,
    result: &SecretSantaResult<ShuffleSummary>,
) -> ShuffleReport {
    match result {
        Ok(summary) => {
            info!(
                group_id = %ctx.group_id,
                acting_user = %ctx.acting_user_id,
                %variant,
                units = summary.units,
                givers = summary.givers,
                attempts = summary.attempts,
                "Secret Santa generated after {} attempts",
                summary.attempts
            );
            SHUFFLES_COUNTER.with_label_values(&[variant.as_str(), "success"]).inc();
            MATCH_ATTEMPTS
                .with_label_values(&[variant.as_str()])
                .observe(summary.attempts as f64);
            ShuffleReport { success: true, error: None, code: None }
        }
        Err(e) => {
            match e {
                SecretSantaError::PersistenceFailure(_) | SecretSantaError::LoadFailure(_) => {
                    error!(group_id = %ctx.group_id, %variant, "Secret Santa draw failed: {e:#}")
                }
                _ => warn!(group_id = %ctx.group_id, %variant, "Secret Santa draw failed: {e}"),
            }
            SHUFFLES_COUNTER.with_label_values(&[variant.as_str(), e.code()]).inc();
            ShuffleReport {
                success: false,
                error: Some(e.to_string()),
                code: Some(e.code()),
            }
        }
    }
}
