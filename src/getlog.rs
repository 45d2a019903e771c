//! Device log retrieval: the `Log` union and its wire decode.
//!
//! `GetLog` asks the device for one or more categories of telemetry;
//! the response populates only the requested variants.

use crate::proto;
use crate::types::{MessageType, PowerLevel};

/// Which category of information to retrieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogType {
    Utilizations,
    Temperatures,
    Capacities,
    Configuration,
    Statistics,
    Messages,
    Limits,
    Device,
}

impl LogType {
    pub(crate) fn to_proto(self) -> proto::LogType {
        match self {
            LogType::Utilizations => proto::LogType::Utilizations,
            LogType::Temperatures => proto::LogType::Temperatures,
            LogType::Capacities => proto::LogType::Capacities,
            LogType::Configuration => proto::LogType::Configuration,
            LogType::Statistics => proto::LogType::Statistics,
            LogType::Messages => proto::LogType::Messages,
            LogType::Limits => proto::LogType::Limits,
            LogType::Device => proto::LogType::Device,
        }
    }
}

/// Utilization of one device component (0.0 to 1.0).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UtilizationLog {
    pub name: String,
    pub value: f32,
}

/// Temperature sensor reading, in degrees Celsius.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemperatureLog {
    pub name: String,
    pub current: f32,
    pub minimum: f32,
    pub maximum: f32,
    pub target: f32,
}

/// Disk capacity information.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapacityLog {
    pub capacity_in_bytes: u64,
    pub portion_full: f32,
}

/// One network interface of the device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationInterface {
    pub name: String,
    pub mac: Vec<u8>,
    pub ipv4_addr: Vec<u8>,
    pub ipv6_addr: Vec<u8>,
}

/// Device identity and build information.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigurationLog {
    pub vendor: String,
    pub model: String,
    pub serial_number: Vec<u8>,
    pub world_wide_name: Vec<u8>,
    pub version: String,
    pub compilation_date: String,
    pub source_hash: String,
    pub protocol_version: String,
    pub protocol_compilation_date: String,
    pub protocol_source_hash: String,
    pub interfaces: Vec<ConfigurationInterface>,
    pub port: i32,
    pub tls_port: i32,
    pub current_power_level: PowerLevel,
}

/// Message counters for one operation type. `bytes` covers only the
/// value portion of the traffic, not command descriptions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatisticsLog {
    pub message_type: MessageType,
    pub count: u64,
    pub bytes: u64,
}

/// Size and count limits enforced by the device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LimitsLog {
    pub max_key_size: u32,
    pub max_value_size: u32,
    pub max_version_size: u32,
    pub max_tag_size: u32,
    pub max_connections: u32,
    pub max_outstanding_read_requests: u32,
    pub max_outstanding_write_requests: u32,
    pub max_message_size: u32,
    pub max_key_range_count: u32,
    pub max_identity_count: u32,
    pub max_pin_size: u32,
    pub max_operation_count_per_batch: u32,
    pub max_batch_count_per_device: u32,
}

/// Named vendor-specific log, returned in the value payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceLog {
    pub name: Vec<u8>,
}

/// Union container for everything `GetLog` can return. Only the
/// requested variants are set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Log {
    pub utilizations: Vec<UtilizationLog>,
    pub temperatures: Vec<TemperatureLog>,
    pub capacity: Option<CapacityLog>,
    pub configuration: Option<ConfigurationLog>,
    pub statistics: Vec<StatisticsLog>,
    pub messages: Vec<u8>,
    pub limits: Option<LimitsLog>,
    pub device: Option<DeviceLog>,
}

impl Log {
    pub(crate) fn from_proto(getlog: &proto::GetLog) -> Self {
        Log {
            utilizations: getlog
                .utilizations
                .iter()
                .map(|u| UtilizationLog {
                    name: u.name.clone().unwrap_or_default(),
                    value: u.value.unwrap_or_default(),
                })
                .collect(),
            temperatures: getlog
                .temperatures
                .iter()
                .map(|t| TemperatureLog {
                    name: t.name.clone().unwrap_or_default(),
                    current: t.current.unwrap_or_default(),
                    minimum: t.minimum.unwrap_or_default(),
                    maximum: t.maximum.unwrap_or_default(),
                    target: t.target.unwrap_or_default(),
                })
                .collect(),
            capacity: getlog.capacity.as_ref().map(|c| CapacityLog {
                capacity_in_bytes: c.nominal_capacity_in_bytes.unwrap_or_default(),
                portion_full: c.portion_full.unwrap_or_default(),
            }),
            configuration: getlog.configuration.as_ref().map(configuration_from_proto),
            statistics: getlog
                .statistics
                .iter()
                .map(|s| StatisticsLog {
                    message_type: s
                        .message_type
                        .and_then(|v| proto::MessageType::try_from(v).ok())
                        .map(MessageType::from_proto)
                        .unwrap_or_default(),
                    count: s.count.unwrap_or_default(),
                    bytes: s.bytes.unwrap_or_default(),
                })
                .collect(),
            messages: getlog.messages.clone().unwrap_or_default(),
            limits: getlog.limits.as_ref().map(|l| LimitsLog {
                max_key_size: l.max_key_size.unwrap_or_default(),
                max_value_size: l.max_value_size.unwrap_or_default(),
                max_version_size: l.max_version_size.unwrap_or_default(),
                max_tag_size: l.max_tag_size.unwrap_or_default(),
                max_connections: l.max_connections.unwrap_or_default(),
                max_outstanding_read_requests: l.max_outstanding_read_requests.unwrap_or_default(),
                max_outstanding_write_requests: l
                    .max_outstanding_write_requests
                    .unwrap_or_default(),
                max_message_size: l.max_message_size.unwrap_or_default(),
                max_key_range_count: l.max_key_range_count.unwrap_or_default(),
                max_identity_count: l.max_identity_count.unwrap_or_default(),
                max_pin_size: l.max_pin_size.unwrap_or_default(),
                max_operation_count_per_batch: l.max_operation_count_per_batch.unwrap_or_default(),
                max_batch_count_per_device: l.max_batch_count_per_device.unwrap_or_default(),
            }),
            device: getlog.device.as_ref().map(|d| DeviceLog {
                name: d.name.clone().unwrap_or_default(),
            }),
        }
    }
}

fn configuration_from_proto(conf: &proto::Configuration) -> ConfigurationLog {
    ConfigurationLog {
        vendor: conf.vendor.clone().unwrap_or_default(),
        model: conf.model.clone().unwrap_or_default(),
        serial_number: conf.serial_number.clone().unwrap_or_default(),
        world_wide_name: conf.world_wide_name.clone().unwrap_or_default(),
        version: conf.version.clone().unwrap_or_default(),
        compilation_date: conf.compilation_date.clone().unwrap_or_default(),
        source_hash: conf.source_hash.clone().unwrap_or_default(),
        protocol_version: conf.protocol_version.clone().unwrap_or_default(),
        protocol_compilation_date: conf.protocol_compilation_date.clone().unwrap_or_default(),
        protocol_source_hash: conf.protocol_source_hash.clone().unwrap_or_default(),
        interfaces: conf
            .interface
            .iter()
            .map(|i| ConfigurationInterface {
                name: i.name.clone().unwrap_or_default(),
                mac: i.mac.clone().unwrap_or_default(),
                ipv4_addr: i.ipv4_address.clone().unwrap_or_default(),
                ipv6_addr: i.ipv6_address.clone().unwrap_or_default(),
            })
            .collect(),
        port: conf.port.unwrap_or_default(),
        tls_port: conf.tls_port.unwrap_or_default(),
        current_power_level: conf
            .current_power_level
            .and_then(|v| proto::PowerLevel::try_from(v).ok())
            .map(PowerLevel::from_proto)
            .unwrap_or_default(),
    }
}
