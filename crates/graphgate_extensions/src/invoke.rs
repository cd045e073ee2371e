//! Invocation of resolved extension methods.

use core::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::error::InvocationError;
use crate::method::{ExtensionCall, ExtensionMethod};
use crate::response::ExtensionResponse;

/// Invokes `method` and enforces the response contract.
///
/// Errors returned by the method and panics raised while it runs become
/// [`InvocationError::Failed`] and [`InvocationError::Panicked`]. A return
/// value that does not decode as an [`ExtensionResponse`] becomes
/// [`InvocationError::ContractViolation`]. Error-status responses are
/// returned as `Ok`; classifying them is up to the caller.
pub async fn invoke(
    method: &dyn ExtensionMethod,
    call: ExtensionCall,
) -> Result<ExtensionResponse, InvocationError> {
    let outcome = AssertUnwindSafe(async move { method.invoke(call).await })
        .catch_unwind()
        .await;

    let value = match outcome {
        Ok(Ok(value)) => value,
        Ok(Err(error)) => return Err(InvocationError::Failed(error)),
        Err(payload) => return Err(InvocationError::Panicked(panic_message(payload.as_ref()))),
    };

    ExtensionResponse::from_value(value)
        .map_err(|error| InvocationError::ContractViolation(error.to_string()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}
