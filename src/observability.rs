use opentelemetry_sdk::trace::{self, RandomIdGenerator, Sampler, Tracer};
use tracing::{subscriber::set_global_default, Subscriber};
use tracing_log::LogTracer;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

use crate::settings::{LogFormat, LoggingSettings, Telemetry};

/// Build the subscriber described by the settings, without installing it
pub fn get_subscriber(name: &str, settings: &LoggingSettings) -> impl Subscriber + Sync + Send {
    let telemetry = match &settings.telemetry {
        Telemetry::Disabled => None,
        Telemetry::Jaeger => build_jaeger(name),
        Telemetry::Datadog { agent } => build_datadog(name, agent),
    };

    let env_filter = EnvFilter::try_new(&settings.filter).unwrap_or_else(|err| {
        eprintln!("Invalid log filter {:?}: {}", settings.filter, err);
        EnvFilter::new("info")
    });

    let (json_fmt, text_fmt) = match settings.format {
        LogFormat::Json => (Some(tracing_subscriber::fmt::layer().json()), None),
        LogFormat::Text => (None, Some(tracing_subscriber::fmt::layer())),
    };

    Registry::default()
        .with(telemetry)
        .with(env_filter)
        .with(json_fmt)
        .with(text_fmt)
}

pub fn init_subscriber(subscriber: impl Subscriber + Sync + Send) {
    LogTracer::init().expect("Failed to set logger");
    set_global_default(subscriber).expect("Failed to set subscriber");
}

fn build_jaeger<S>(name: &str) -> Option<OpenTelemetryLayer<S, Tracer>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    opentelemetry_jaeger::new_agent_pipeline()
        .with_service_name(name)
        .install_batch(opentelemetry_sdk::runtime::Tokio)
        .map_err(|err| eprintln!("Jaeger error {:?}", err))
        .ok()
        .map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer))
}

fn build_datadog<S>(name: &str, agent: &str) -> Option<OpenTelemetryLayer<S, Tracer>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    opentelemetry_datadog::new_pipeline()
        .with_service_name(name)
        .with_agent_endpoint(agent)
        .with_trace_config(
            trace::config()
                .with_sampler(Sampler::AlwaysOn)
                .with_id_generator(RandomIdGenerator::default()),
        )
        .install_batch(opentelemetry_sdk::runtime::Tokio)
        .map_err(|err| eprintln!("Datadog error {:?}", err))
        .ok()
        .map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer))
}

#[cfg(test)]
mod tests {
    use tracing::subscriber::with_default;

    use super::*;

    #[test]
    fn falls_back_on_info_with_a_broken_filter() {
        let settings = LoggingSettings {
            filter: String::from("yanews=loud"),
            format: LogFormat::Json,
            telemetry: Telemetry::Disabled,
        };

        let subscriber = get_subscriber("yanews-test", &settings);

        with_default(subscriber, || tracing::info!("Still logging"));
    }
}
