// Déclaration des modules
pub mod attacks;
pub mod crypto_error;
pub mod gcms;
pub mod key_management;
pub mod oracle;
pub mod partition;
pub mod rsa_oaep;
pub mod unknown_domain;

// Oracles PSI
pub use crate::oracle::{psi, psi_cardinality, psi_sum, psi_sum_int};

// Arbre de partition
pub use crate::partition::TreeNode;

// Moteurs d'attaque
pub use crate::attacks::actbayesian::{actbayesian, ActBayesianOutcome};
pub use crate::attacks::baseline::{
    baseline_attack_with_limited_call, improved_baseline_attack_with_limited_call,
};
pub use crate::attacks::dynpathblizer::{dynpathblizer, LeakageMemo};
pub use crate::attacks::treesumexplorer::{
    improved_attack_with_sum_only, n_sum, psi_sum_attack,
};

// Volet LDP
pub use crate::gcms::{GcmsParams, GcmsServer};
pub use crate::unknown_domain::{ThresholdParams, UnknownDomainAuxServer, UnknownDomainServer};

// Types RSA depuis keygen
pub use crate::rsa_oaep::r_keygen::{KeyPair, PublicKey, SecretKey};

// Erreur centralisée
pub use crypto_error::CryptoError;
