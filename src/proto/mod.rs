// Generated by build.rs (tonic-build) when the `grpc` feature is enabled

pub mod items {
    include!("assets.items.rs");
}

pub mod health {
    include!("assets.health.rs");
}
