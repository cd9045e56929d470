use crate::config::toml_config::{CarrierConfig, StoreConfig, TomlConfig};
use crate::core::dimensions::{CarrierDimensions, SizeLimits};
use crate::core::request::RateRequest;
use crate::core::response::CarrierResponse;
use crate::domain::model::{
    ErrorReport, Package, RateQuoteResult, ReportSeverity, ShippingDestination, ShippingOptions,
};
use crate::domain::ports::{ErrorReporter, Packager, RateTransport};
use crate::domain::units::StoreUnits;
use crate::utils::error::{NoQuoteReason, QuoteError, Result};
use rust_decimal::Decimal;

pub const SERVICE_SLUG: &str = "InXpress";
pub const RATE_ERROR_CODE: &str = "inxpress_rate_error";
pub const VERIFY_ERROR_CODE: &str = "inxpress_verify_auth";

/// Width, height, length and weight of the credential probe, in carrier units.
const PROBE_SIZE: u64 = 12;

pub struct RateQuoter<T: RateTransport> {
    carrier: CarrierConfig,
    base_country: String,
    units: StoreUnits,
    limits: SizeLimits,
    transport: T,
}

impl<T: RateTransport> RateQuoter<T> {
    pub fn new(
        carrier: CarrierConfig,
        store: &StoreConfig,
        limits: SizeLimits,
        transport: T,
    ) -> Self {
        Self {
            carrier,
            base_country: store.base_country.trim().to_ascii_uppercase(),
            units: store.units(),
            limits,
            transport,
        }
    }

    pub fn from_config(config: &TomlConfig, transport: T) -> Self {
        Self::new(
            config.carrier.clone(),
            &config.store,
            config.limits.clone(),
            transport,
        )
    }

    pub fn carrier(&self) -> &CarrierConfig {
        &self.carrier
    }

    pub fn is_international(&self, destination: &ShippingDestination) -> bool {
        destination.country_code() != self.base_country
    }

    pub fn build_request(&self, package: &Package, postcode: &str, country: &str) -> RateRequest {
        let dimensions = self.limits.measure(&self.units, package);
        tracing::debug!(
            "Package sized to {}x{}x{}, weight {} + {} sub-units",
            dimensions.length,
            dimensions.width,
            dimensions.height,
            dimensions.weight,
            dimensions.weight_sub_units
        );
        self.request_for(dimensions, postcode, country)
    }

    fn request_for(
        &self,
        dimensions: CarrierDimensions,
        postcode: &str,
        country: &str,
    ) -> RateRequest {
        RateRequest {
            account_id: self.carrier.account_id.clone(),
            postcode: postcode.to_string(),
            country: country.to_string(),
            dimensions,
        }
    }

    async fn send(&self, request: &RateRequest) -> Result<CarrierResponse> {
        let url = request.to_url(&self.carrier.endpoint)?;
        tracing::debug!("Requesting InXpress rate: {}", url);

        let body = self
            .transport
            .fetch(&url)
            .await
            .map_err(|e| QuoteError::TransportFailure {
                detail: e.to_string(),
            })?;

        if body.trim().is_empty() {
            return Err(QuoteError::TransportFailure {
                detail: "empty response body".to_string(),
            });
        }

        Ok(CarrierResponse::parse(&body))
    }

    /// Prices every package the packager yields and sums the charges.
    ///
    /// Domestic destinations and missing postcodes short-circuit with
    /// [`QuoteError::NoQuoteApplicable`] before any request is made. Any
    /// package failure aborts the whole quote.
    pub async fn quote<P: Packager + ?Sized>(
        &self,
        destination: &ShippingDestination,
        packager: &mut P,
    ) -> Result<RateQuoteResult> {
        if !self.is_international(destination) {
            return Err(QuoteError::NoQuoteApplicable(
                NoQuoteReason::DomesticDestination,
            ));
        }

        let postcode = destination.normalized_postcode();
        if postcode.is_empty() {
            return Err(QuoteError::NoQuoteApplicable(NoQuoteReason::MissingPostcode));
        }

        let mut total = Decimal::ZERO;
        let mut packages = 0usize;

        while packager.has_packages() {
            let Some(package) = packager.take_package() else {
                break;
            };
            packages += 1;

            let request = self.build_request(&package, &postcode, &destination.country);
            match self.send(&request).await? {
                CarrierResponse::Error { messages } => {
                    return Err(QuoteError::CarrierRejected {
                        message: messages.into_iter().next().unwrap_or_default(),
                    });
                }
                CarrierResponse::Unrecognized => return Err(QuoteError::MalformedResponse),
                CarrierResponse::Rating { total_charge } => {
                    tracing::debug!("Package {} charge: {}", packages, total_charge);
                    total += total_charge;
                }
            }
        }

        tracing::info!(
            "InXpress quote for {} package(s) to {}: {}",
            packages,
            destination.country,
            total
        );

        Ok(RateQuoteResult {
            service_slug: SERVICE_SLUG.to_string(),
            display_name: self.carrier.service_type.clone(),
            amount: total,
        })
    }

    /// Checks the account id against the carrier with a fixed-size parcel
    /// sent to `destination`.
    pub async fn verify(&self, destination: &ShippingDestination) -> Result<()> {
        let request = self.request_for(
            CarrierDimensions::uniform(PROBE_SIZE),
            &destination.normalized_postcode(),
            &destination.country,
        );

        match self.send(&request).await? {
            CarrierResponse::Error { messages } => Err(QuoteError::CarrierRejected {
                message: messages.join(" "),
            }),
            CarrierResponse::Rating { .. } => {
                tracing::info!("InXpress account {} verified", self.carrier.account_id);
                Ok(())
            }
            CarrierResponse::Unrecognized => {
                tracing::warn!("InXpress verification returned neither a rating nor an error");
                Ok(())
            }
        }
    }

    /// Quotes into the host's options collection. Failures are filed with
    /// `reporter` and leave `options` untouched. Returns whether a rate was added.
    pub async fn calculate<P: Packager + ?Sized>(
        &self,
        options: &mut ShippingOptions,
        destination: &ShippingDestination,
        packager: &mut P,
        reporter: &dyn ErrorReporter,
    ) -> bool {
        match self.quote(destination, packager).await {
            Ok(rate) => {
                options.insert(rate);
                true
            }
            Err(e) => {
                report_error(reporter, &e, RATE_ERROR_CODE, ReportSeverity::Transaction);
                false
            }
        }
    }

    pub async fn verify_and_report(
        &self,
        destination: &ShippingDestination,
        reporter: &dyn ErrorReporter,
    ) -> bool {
        match self.verify(destination).await {
            Ok(()) => true,
            Err(e) => {
                report_error(reporter, &e, VERIFY_ERROR_CODE, ReportSeverity::Addon);
                false
            }
        }
    }
}

/// Files `error` with `reporter` unless it is a skipped quote.
pub fn report_error(
    reporter: &dyn ErrorReporter,
    error: &QuoteError,
    code: &str,
    severity: ReportSeverity,
) {
    if !error.is_reportable() {
        tracing::debug!("{}", error);
        return;
    }
    if let QuoteError::TransportFailure { detail } = error {
        tracing::debug!("InXpress transport failure: {}", detail);
    }
    reporter.report(ErrorReport {
        message: error.to_string(),
        code: code.to_string(),
        severity,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::packager::ItemPackager;
    use crate::adapters::reporter::MemoryReporter;
    use crate::core::request::DEFAULT_ENDPOINT;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use url::Url;

    /// Replays canned bodies in order and records every requested URL.
    #[derive(Clone, Default)]
    struct ScriptedTransport {
        replies: Arc<Mutex<VecDeque<Result<String>>>>,
        requests: Arc<Mutex<Vec<Url>>>,
    }

    impl ScriptedTransport {
        fn new(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: Arc::new(Mutex::new(replies.into())),
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }

        async fn requests(&self) -> Vec<Url> {
            self.requests.lock().await.clone()
        }
    }

    #[async_trait::async_trait]
    impl RateTransport for ScriptedTransport {
        async fn fetch(&self, url: &Url) -> Result<String> {
            self.requests.lock().await.push(url.clone());
            self.replies
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| Ok(String::new()))
        }
    }

    fn rating(charge: &str) -> Result<String> {
        Ok(format!(
            "<ratingResponse><totalCharge>{}</totalCharge></ratingResponse>",
            charge
        ))
    }

    fn carrier() -> CarrierConfig {
        CarrierConfig {
            account_id: "ACME1".to_string(),
            service_type: "InXpress Service".to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_seconds: 30,
        }
    }

    fn quoter(transport: ScriptedTransport) -> RateQuoter<ScriptedTransport> {
        RateQuoter::new(
            carrier(),
            &StoreConfig::new("US"),
            SizeLimits::default(),
            transport,
        )
    }

    fn packages(list: &[Package]) -> ItemPackager {
        ItemPackager::from_packages(list.iter().copied())
    }

    fn sample_package() -> Package {
        Package::new(10.0, 5.0, 8.0, 2.3)
    }

    #[tokio::test]
    async fn test_domestic_order_makes_no_request() {
        let transport = ScriptedTransport::new(vec![rating("10.00")]);
        let quoter = quoter(transport.clone());
        let mut packager = packages(&[sample_package()]);

        let result = quoter
            .quote(&ShippingDestination::new("10001", "US"), &mut packager)
            .await;

        assert!(matches!(
            result,
            Err(QuoteError::NoQuoteApplicable(NoQuoteReason::DomesticDestination))
        ));
        assert!(transport.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_domestic_check_is_case_insensitive() {
        let transport = ScriptedTransport::new(vec![]);
        let quoter = quoter(transport.clone());
        let mut packager = packages(&[sample_package()]);

        let result = quoter
            .quote(&ShippingDestination::new("10001", "us"), &mut packager)
            .await;

        assert!(matches!(result, Err(QuoteError::NoQuoteApplicable(_))));
        assert!(transport.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_blank_postcode_makes_no_request() {
        let transport = ScriptedTransport::new(vec![rating("10.00")]);
        let quoter = quoter(transport.clone());

        for postcode in ["", "   "] {
            let mut packager = packages(&[sample_package()]);
            let result = quoter
                .quote(&ShippingDestination::new(postcode, "CA"), &mut packager)
                .await;
            assert!(matches!(
                result,
                Err(QuoteError::NoQuoteApplicable(NoQuoteReason::MissingPostcode))
            ));
        }
        assert!(transport.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_postcode_spaces_are_stripped_in_request() {
        let transport = ScriptedTransport::new(vec![rating("10.00")]);
        let quoter = quoter(transport.clone());
        let mut packager = packages(&[sample_package()]);

        quoter
            .quote(&ShippingDestination::new(" 9 0 2 1 0", "CA"), &mut packager)
            .await
            .unwrap();

        let requests = transport.requests().await;
        assert_eq!(requests.len(), 1);
        assert!(requests[0].as_str().contains("dst=90210&"));
    }

    #[tokio::test]
    async fn test_single_package_scenario() {
        let transport = ScriptedTransport::new(vec![rating("42.10")]);
        let quoter = quoter(transport.clone());
        let mut packager = packages(&[sample_package()]);

        let rate = quoter
            .quote(&ShippingDestination::new("10001", "CA"), &mut packager)
            .await
            .unwrap();

        assert_eq!(
            rate,
            RateQuoteResult {
                service_slug: "InXpress".to_string(),
                display_name: "InXpress Service".to_string(),
                amount: Decimal::new(4210, 2),
            }
        );

        let requests = transport.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].query(),
            Some("acc=ACME1&dst=10001&pst=CA&prd=P&wgt=2&pcs=8|10|5|2")
        );
    }

    #[tokio::test]
    async fn test_charges_are_summed_across_packages() {
        let transport = ScriptedTransport::new(vec![rating("10.00"), rating("15.50")]);
        let quoter = quoter(transport.clone());
        let mut packager = packages(&[sample_package(), Package::new(4.0, 4.0, 4.0, 1.0)]);

        let rate = quoter
            .quote(&ShippingDestination::new("SW1A 1AA", "GB"), &mut packager)
            .await
            .unwrap();

        assert_eq!(rate.amount, Decimal::new(2550, 2));
        assert_eq!(transport.requests().await.len(), 2);
        assert!(!packager.has_packages());
    }

    #[tokio::test]
    async fn test_transport_failure_aborts_remaining_packages() {
        let transport = ScriptedTransport::new(vec![
            rating("10.00"),
            Err(QuoteError::ConfigError {
                message: "connection reset".to_string(),
            }),
            rating("99.00"),
        ]);
        let quoter = quoter(transport.clone());
        let mut packager = packages(&[sample_package(), sample_package(), sample_package()]);
        let reporter = MemoryReporter::new();
        let mut options = ShippingOptions::new();

        let added = quoter
            .calculate(
                &mut options,
                &ShippingDestination::new("10001", "CA"),
                &mut packager,
                &reporter,
            )
            .await;

        assert!(!added);
        assert!(options.is_empty());
        assert_eq!(transport.requests().await.len(), 2);

        let reports = reporter.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].code, RATE_ERROR_CODE);
        assert_eq!(reports[0].severity, ReportSeverity::Transaction);
    }

    #[tokio::test]
    async fn test_empty_body_is_transport_failure() {
        let transport = ScriptedTransport::new(vec![Ok("  \n".to_string())]);
        let quoter = quoter(transport);
        let mut packager = packages(&[sample_package()]);

        let result = quoter
            .quote(&ShippingDestination::new("10001", "CA"), &mut packager)
            .await;

        assert!(matches!(result, Err(QuoteError::TransportFailure { .. })));
    }

    #[tokio::test]
    async fn test_carrier_error_reported_verbatim() {
        let transport = ScriptedTransport::new(vec![Ok(
            "<errorResponse><message>Invalid account</message><message>Second</message></errorResponse>"
                .to_string(),
        )]);
        let quoter = quoter(transport);
        let mut packager = packages(&[sample_package(), sample_package()]);
        let reporter = MemoryReporter::new();
        let mut options = ShippingOptions::new();

        let added = quoter
            .calculate(
                &mut options,
                &ShippingDestination::new("10001", "CA"),
                &mut packager,
                &reporter,
            )
            .await;

        assert!(!added);
        let reports = reporter.reports();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].message.contains("Invalid account"));
        assert!(!reports[0].message.contains("Second"));
    }

    #[tokio::test]
    async fn test_unrecognized_response_is_malformed() {
        let transport = ScriptedTransport::new(vec![Ok("<status>ok</status>".to_string())]);
        let quoter = quoter(transport);
        let mut packager = packages(&[sample_package()]);

        let result = quoter
            .quote(&ShippingDestination::new("10001", "CA"), &mut packager)
            .await;

        assert!(matches!(result, Err(QuoteError::MalformedResponse)));
    }

    #[tokio::test]
    async fn test_calculate_adds_option_under_slug() {
        let transport = ScriptedTransport::new(vec![rating("42.10")]);
        let quoter = quoter(transport);
        let mut packager = packages(&[sample_package()]);
        let reporter = MemoryReporter::new();
        let mut options = ShippingOptions::new();

        let added = quoter
            .calculate(
                &mut options,
                &ShippingDestination::new("10001", "CA"),
                &mut packager,
                &reporter,
            )
            .await;

        assert!(added);
        assert_eq!(options.get(SERVICE_SLUG).unwrap().amount, Decimal::new(4210, 2));
        assert!(reporter.reports().is_empty());
    }

    #[tokio::test]
    async fn test_calculate_skips_domestic_without_report() {
        let transport = ScriptedTransport::new(vec![]);
        let quoter = quoter(transport);
        let mut packager = packages(&[sample_package()]);
        let reporter = MemoryReporter::new();
        let mut options = ShippingOptions::new();

        let added = quoter
            .calculate(
                &mut options,
                &ShippingDestination::new("10001", "US"),
                &mut packager,
                &reporter,
            )
            .await;

        assert!(!added);
        assert!(reporter.reports().is_empty());
    }

    #[tokio::test]
    async fn test_verify_sends_probe_parcel() {
        let transport = ScriptedTransport::new(vec![rating("80.00")]);
        let quoter = quoter(transport.clone());

        quoter
            .verify(&ShippingDestination::new("M5V 2T6", "CA"))
            .await
            .unwrap();

        let requests = transport.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].query(),
            Some("acc=ACME1&dst=M5V2T6&pst=CA&prd=P&wgt=12&pcs=12|12|12|12")
        );
    }

    #[tokio::test]
    async fn test_verify_joins_carrier_messages() {
        let transport = ScriptedTransport::new(vec![Ok(
            "<errorResponse><message>Account</message><message>not found</message></errorResponse>"
                .to_string(),
        )]);
        let quoter = quoter(transport);
        let reporter = MemoryReporter::new();

        let ok = quoter
            .verify_and_report(&ShippingDestination::new("M5V 2T6", "CA"), &reporter)
            .await;

        assert!(!ok);
        let reports = reporter.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].message, "InXpress: Account not found");
        assert_eq!(reports[0].code, VERIFY_ERROR_CODE);
        assert_eq!(reports[0].severity, ReportSeverity::Addon);
    }
}
