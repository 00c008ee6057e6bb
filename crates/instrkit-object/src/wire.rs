//! Fixed wire contract: service names, selectors and well-known record keys.
//!
//! None of these are configurable; the remote side matches them verbatim.

/// Process launch, kill and observation.
pub const PROCESS_CONTROL: &str = "com.apple.instruments.server.services.processcontrol";

/// Running processes and system information.
pub const DEVICE_INFO: &str = "com.apple.instruments.server.services.deviceinfo";

/// Installed application listing. The misspelling is part of the service name.
pub const APPLICATION_LISTING: &str =
    "com.apple.instruments.server.services.device.applictionListing";

/// System monitor push telemetry.
pub const SYSMONTAP: &str = "com.apple.instruments.server.services.sysmontap";

pub mod selector {
    pub const LAUNCH_SUSPENDED_PROCESS: &str =
        "launchSuspendedProcessWithDevicePath:bundleIdentifier:environment:arguments:options:";
    pub const PROCESS_IDENTIFIER_FOR_BUNDLE: &str = "processIdentifierForBundleIdentifier:";
    pub const START_OBSERVING_PID: &str = "startObservingPid:";
    pub const KILL_PID: &str = "killPid:";
    pub const RUNNING_PROCESSES: &str = "runningProcesses";
    pub const INSTALLED_APPLICATIONS: &str =
        "installedApplicationsMatching:registerUpdateToken:";
    pub const SYSTEM_INFORMATION: &str = "systemInformation";
    pub const SET_CONFIG: &str = "setConfig:";
    pub const START: &str = "start";
    pub const STOP: &str = "stop";
}

/// Keys of the structured error object returned in place of a result.
pub mod fault {
    pub const USER_INFO: &str = "NSUserInfo";
    pub const LOCALIZED_DESCRIPTION: &str = "NSLocalizedDescription";
    pub const DOMAIN: &str = "NSDomain";
    pub const CODE: &str = "NSCode";
}

/// Launch option keys understood by the process-control service.
pub mod launch {
    pub const START_SUSPENDED: &str = "StartSuspendedKey";
    pub const KILL_EXISTING: &str = "KillExisting";
}

/// Keys of the sysmontap configuration record.
pub mod sysmon {
    pub const SAMPLE_RATE: &str = "ur";
    pub const BASELINE_MODE: &str = "bm";
    pub const PROC_ATTRS: &str = "procAttrs";
    pub const SYS_ATTRS: &str = "sysAttrs";
    pub const CPU_USAGE: &str = "cpuUsage";
    pub const SAMPLE_INTERVAL: &str = "sampleInterval";
}

/// Returns a short human-readable name for a service.
pub fn service_name(service: &str) -> &str {
    match service {
        PROCESS_CONTROL => "processcontrol",
        DEVICE_INFO => "deviceinfo",
        APPLICATION_LISTING => "application-listing",
        SYSMONTAP => "sysmontap",
        other => other.rsplit('.').next().unwrap_or(other),
    }
}
