use super::ConvertService;
use crate::models::{ConversionRequest, ConversionResult};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Scripted conversion service.
///
/// Queued outcomes are consumed in order; once the queue is empty every
/// call succeeds with a result echoing the request.
#[derive(Clone)]
pub struct MockConvertClient {
    outcomes: Arc<Mutex<VecDeque<Option<u16>>>>,
    requests: Arc<Mutex<Vec<ConversionRequest>>>,
}

impl MockConvertClient {
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_success(self) -> Self {
        self.outcomes.lock().unwrap().push_back(None);
        self
    }

    /// Queue a failure reported as the given HTTP status.
    pub fn with_failure(self, status: u16) -> Self {
        self.outcomes.lock().unwrap().push_back(Some(status));
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn get_requests(&self) -> Vec<ConversionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockConvertClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConvertService for MockConvertClient {
    async fn convert(&self, request: &ConversionRequest) -> Result<ConversionResult> {
        self.requests.lock().unwrap().push(request.clone());

        let outcome = self.outcomes.lock().unwrap().pop_front().flatten();
        if let Some(status) = outcome {
            return Err(Error::Status {
                status,
                body: "{\"error\":\"Error converting image\"}".to_string(),
            });
        }

        let name = match &request.original_name {
            Some(original) => format!("{}.{}", original, request.format),
            None => format!("converted.{}", request.format),
        };
        Ok(ConversionResult {
            name,
            size: request.image_src.len(),
            data: "AAAA".to_string(),
        })
    }
}
