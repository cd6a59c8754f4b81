//! Generated bindings for the descriptor fixtures, compiled against
//! `nexus_temporal_core`.
//!
//! The message types stand in for what `prost-build` would emit for the same
//! packages; the bindings modules are included from the build script output.

pub mod example {
    pub mod v1 {
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct ExampleInput {
            #[prost(string, tag = "1")]
            pub foo: ::prost::alloc::string::String,
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct ExampleOutput {
            #[prost(string, tag = "1")]
            pub foo: ::prost::alloc::string::String,
        }

        include!(concat!(env!("OUT_DIR"), "/example/v1/example_nexus_temporal.rs"));
        include!(concat!(env!("OUT_DIR"), "/example/v1/example_nexus_temporal_register.rs"));
    }
}

pub mod shapes {
    pub mod v1 {
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct In {
            #[prost(string, tag = "1")]
            pub value: ::prost::alloc::string::String,
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Out {
            #[prost(string, tag = "1")]
            pub value: ::prost::alloc::string::String,
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Outer {}

        /// Nested message and enum types in `Outer`.
        pub mod outer {
            #[derive(Clone, PartialEq, ::prost::Message)]
            pub struct Inner {
                #[prost(string, tag = "1")]
                pub value: ::prost::alloc::string::String,
            }
        }

        include!(concat!(env!("OUT_DIR"), "/shapes/v1/shapes_nexus_temporal.rs"));
    }
}
