//! Driver fatigue monitoring: eye/mouth openness metrics, a debounced alert
//! state machine with timed escalation, and the adapters that feed it.

pub mod shared {
    pub mod clock;
    pub mod config;
    pub mod constants;
    pub mod frame;
    pub mod point;
}

pub mod geometry {
    pub mod aspect_ratio;
}

pub mod detection {
    pub mod domain {
        pub mod face_selection;
        pub mod landmark_provider;
        pub mod landmark_set;
    }
    pub mod infrastructure;
}

pub mod alerting {
    pub mod domain {
        pub mod fatigue_state;
        pub mod fatigue_state_machine;
        pub mod monitor_event;
        pub mod thresholds;
    }
}

pub mod actuation {
    pub mod domain {
        pub mod actuator_bank;
        pub mod actuator_sink;
    }
    pub mod infrastructure;
}

pub mod video {
    pub mod domain {
        pub mod frame_source;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod fatigue_monitor_use_case;
    pub mod monitor_logger;
}
