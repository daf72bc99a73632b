use std::net::{IpAddr, Ipv6Addr, SocketAddr};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Port on which the Prometheus scrape endpoint listens.
const METRICS_PORT: u16 = 9000;

/// Initializes metrics with an automatic HTTP server on port 9000.
///
/// Installs a global metrics recorder and starts an HTTP server listening on
/// `[::]:9000/metrics` for Prometheus scraping. Must be called from within a
/// tokio runtime. Calling it twice fails because the global recorder can be
/// installed only once.
pub fn init_metrics() -> Result<(), BuildError> {
    let builder = PrometheusBuilder::new().with_http_listener(SocketAddr::new(
        IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        METRICS_PORT,
    ));

    builder.install()?;

    Ok(())
}
