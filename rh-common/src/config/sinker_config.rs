use super::config_enums::SinkType;

#[derive(Clone, Debug)]
pub struct SinkerConfig {
    pub sink_type: SinkType,
}
