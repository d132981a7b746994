pub mod app;

pub mod shared {
    pub mod types {
        pub mod app;
    }
    pub mod util {
        pub mod clean_html;
        pub mod clock;
        pub mod config;
        pub mod handler;
    }
}

pub mod demo {
    pub mod app;
    pub mod registry;
    pub mod simulation;
    pub mod types;
    pub mod handlers {
        pub mod memory_handler;
        pub mod postgres_handler;
    }
    pub mod util {
        pub mod handler;
    }
}

pub mod contact {
    pub mod app;
    pub mod inbox;
    pub mod types;
    pub mod handlers {
        pub mod memory_handler;
        pub mod postgres_handler;
    }
    pub mod util {
        pub mod handler;
    }
}

pub mod site {
    pub mod app;
}
