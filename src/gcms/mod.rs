pub mod gcms_client;
pub mod gcms_server;
pub mod gcms_shuffler;
pub mod gcms_utils;

pub use gcms_client::{on_device_ldp_algorithm, randomize_message, ClientBatch};
pub use gcms_server::GcmsServer;
pub use gcms_shuffler::shuffle;
pub use gcms_utils::{
    byte_length, deserialize_integers_from_bytes, generate_laplace_noise, hash_encode,
    serialize_integers_to_bytes, GcmsParams,
};
