use std::sync::Arc;

use axum::http::HeaderValue;

use odg_service::GatewayService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<GatewayService>,
	/// `Cache-Control` value attached to every successful response.
	pub cache_control: HeaderValue,
}
impl AppState {
	pub fn new(config: odg_config::Config) -> color_eyre::Result<Self> {
		Self::from_service(GatewayService::new(config)?)
	}

	pub fn from_service(service: GatewayService) -> color_eyre::Result<Self> {
		let cache_control = HeaderValue::from_str(&service.cfg.cache.cache_control())?;

		Ok(Self { service: Arc::new(service), cache_control })
	}
}
