fn main() {
    // Build-time defaults for `DeviceConfig` (read with `option_env!`).
    for var in [
        "FEEDLOG_WIFI_SSID",
        "FEEDLOG_WIFI_PASS",
        "FEEDLOG_STATIC_IP",
        "FEEDLOG_GATEWAY",
        "FEEDLOG_SUBNET",
        "FEEDLOG_DNS",
        "FEEDLOG_MQTT_HOST",
        "FEEDLOG_MQTT_PORT",
        "FEEDLOG_MQTT_CLIENT",
        "FEEDLOG_MQTT_USER",
        "FEEDLOG_MQTT_PASS",
        "FEEDLOG_TOPIC_TIME",
        "FEEDLOG_TOPIC_STATUS",
    ] {
        println!("cargo:rerun-if-env-changed={var}");
    }

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
