use crate::config::Config;

/// log into the test output, ignoring the error when a subscriber
/// was already installed by another test in the same binary.
pub fn init() {
    let filter = Config::filter_from_env("akamai_purge=debug")
        .expect("static default directive is valid");

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
