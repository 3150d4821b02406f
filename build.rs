fn main() {
    // ESP-IDF toolchain environment is only needed for device builds.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
