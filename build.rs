fn main() {
    // Only meaningful when building against ESP-IDF; a host (test) build
    // has no sysenv to propagate.
    if std::env::var_os("CARGO_FEATURE_ESPIDF").is_some() {
        embuild::espidf::sysenv::output();
    }
}
