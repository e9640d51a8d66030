//! Response envelope.

use serde::Serialize;

/// `{ "data": T }` wrapper every handler returns its payload in.
///
/// ```ignore
/// Ok(Json(DataResponse { data: status }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
