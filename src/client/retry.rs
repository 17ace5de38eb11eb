use std::thread;
use std::time::Duration;

use serde_json::{Map, Value};

use super::{ClientError, Transport};

/// Retries a failing transport a fixed number of times with a fixed delay.
pub struct Retrying<T> {
    inner: T,
    attempts: usize,
    delay: Duration,
}

impl<T: Transport> Retrying<T> {
    pub fn new(inner: T, attempts: usize, delay: Duration) -> Self {
        Self {
            inner,
            attempts: attempts.max(1),
            delay,
        }
    }
}

impl<T: Transport> Transport for Retrying<T> {
    fn send_request(&self, payload: &Map<String, Value>) -> Result<Value, ClientError> {
        let mut attempt = 1;
        loop {
            match self.inner.send_request(payload) {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) if attempt >= self.attempts => {
                    tracing::error!(attempts = self.attempts, error = %err, "request retries exhausted");
                    return Err(ClientError::RetriesExhausted {
                        attempts: self.attempts,
                        last: Box::new(err),
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        attempt,
                        of = self.attempts,
                        error = %err,
                        "request failed, retrying"
                    );
                    attempt += 1;
                    thread::sleep(self.delay);
                }
            }
        }
    }
}
