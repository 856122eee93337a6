use std::fmt::Display;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// How a fallback chain ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainOutcome<T, E> {
    Success {
        value: T,
        index: usize,
        failures: Vec<E>,
    },
    Exhausted {
        failures: Vec<E>,
    },
    Cancelled {
        failures: Vec<E>,
    },
}

/// Run `operation` against each candidate in order until one succeeds.
///
/// Each candidate is tried exactly once; there is no delay between attempts.
/// Cancelling `cancel` abandons the in-flight attempt and every candidate
/// after it.
///
/// # Arguments
/// * `candidates` - Transport paths in the order they should be tried
/// * `cancel` - Token checked before and raced against every attempt
/// * `operation` - Builds the attempt future for `(index, candidate)`
pub async fn first_success<C, F, Fut, T, E>(
    candidates: &[C],
    cancel: &CancellationToken,
    mut operation: F,
) -> ChainOutcome<T, E>
where
    F: FnMut(usize, &C) -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: Display,
{
    let total = candidates.len();
    let mut failures = Vec::new();

    for (index, candidate) in candidates.iter().enumerate() {
        if cancel.is_cancelled() {
            return ChainOutcome::Cancelled { failures };
        }

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => return ChainOutcome::Cancelled { failures },
            result = operation(index, candidate) => result,
        };

        match result {
            Ok(value) => {
                return ChainOutcome::Success {
                    value,
                    index,
                    failures,
                };
            }
            Err(e) => {
                let attempt = index + 1;
                if attempt < total {
                    warn!("Request failed (attempt {attempt}/{total}): {e}. Trying next candidate...");
                } else {
                    warn!("Request failed (attempt {attempt}/{total}): {e}. No candidates left");
                }
                failures.push(e);
            }
        }
    }

    ChainOutcome::Exhausted { failures }
}
