pub(crate) mod data {
    pub(crate) mod datasources {
        pub(crate) mod verification_server_datasource;
    }
    pub(crate) mod models {
        pub(crate) mod verification_server {
            pub(crate) mod verification_request_model;
            pub(crate) mod verification_response_model;
        }
    }
    pub(crate) mod repositories {
        pub(crate) mod verification_repository_impl;
    }
}

pub mod domain {
    pub mod entities {
        pub mod payment_transaction;
        pub mod product;
        pub mod purchasable_option;
        pub mod store_error;
        pub mod subscription_check;
        pub mod verification_response;
    }
    pub mod repositories {
        pub mod verification_repository;
    }
    pub(crate) mod transaction_handler;
}

pub mod platform {
    pub mod payment_queue;
    pub mod product_catalog;
    pub mod receipt_source;
}

pub mod config;
pub mod errors;
pub mod localization;
pub mod notifications;
pub mod util;
