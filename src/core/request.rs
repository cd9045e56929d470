use crate::core::dimensions::CarrierDimensions;
use crate::utils::error::{QuoteError, Result};
use url::form_urlencoded::byte_serialize;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "http://www.ixpapi.com/ixpapp/rates.php";

/// Product code sent with every rate lookup (parcel).
const PRODUCT_CODE: &str = "P";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateRequest {
    pub account_id: String,
    pub postcode: String,
    pub country: String,
    pub dimensions: CarrierDimensions,
}

impl RateRequest {
    /// Query string in the carrier's fixed parameter order. `pcs` carries
    /// length, width, height and weight, so weight appears twice.
    pub fn query(&self) -> String {
        let dims = &self.dimensions;
        format!(
            "acc={}&dst={}&pst={}&prd={}&wgt={}&pcs={}|{}|{}|{}",
            encode(&self.account_id),
            encode(&self.postcode),
            encode(&self.country),
            PRODUCT_CODE,
            dims.weight,
            dims.length,
            dims.width,
            dims.height,
            dims.weight,
        )
    }

    pub fn to_url(&self, endpoint: &str) -> Result<Url> {
        let separator = if endpoint.contains('?') { '&' } else { '?' };
        let raw = format!("{}{}{}", endpoint, separator, self.query());
        Url::parse(&raw).map_err(|e| QuoteError::InvalidConfigValueError {
            field: "carrier.endpoint".to_string(),
            value: endpoint.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })
    }
}

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}
