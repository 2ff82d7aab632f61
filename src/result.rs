/// Result of the steps run by the binaries, which report their failures as
/// messages.
pub type Result<T> = std::result::Result<T, String>;
pub type NResult<T> = std::result::Result<T, Vec<String>>;
