// ===========================================================================
// Gestion centralisée des erreurs cryptographiques
//
// Tous les modules du volet LDP (RSA-OAEP, stockage de clés, serveurs)
// utilisent ce type au lieu de panic!/assert!/unwrap(). L'appelant reçoit
// une Err(...) et peut réagir proprement sans crasher le thread.
//
// Les moteurs d'attaque n'apparaissent pas ici : l'épuisement du budget τ
// est une terminaison normale (valeur de retour ordinaire), et une violation
// d'invariant interne est une erreur de programmation (debug_assert!).
// ===========================================================================

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum CryptoError {
    // --- Erreurs de paramètres d'entrée ---
    /// Le message est trop long pour un encodage OAEP sous ce module RSA
    MessageTooLong { length: usize, maximum: usize },
    /// Le chiffré n'a pas la taille du module, ou représente un entier >= n
    CiphertextOutOfRange,
    /// La taille de clé demandée est trop petite (< MIN_KEY_BITS)
    KeySizeTooSmall { requested: u64, minimum: u64 },

    // --- Erreurs mathématiques internes ---
    /// L'inverse modulaire n'existe pas (gcd != 1)
    NoModularInverse,
    /// Conversion BigInt -> BigUint échouée (résultat négatif — invariant interne)
    NegativeConversion,

    // --- Erreurs de déchiffrement ---
    /// Le décodage EME-OAEP a échoué. Volontairement opaque : on ne révèle
    /// pas quelle vérification a échoué (oracle de padding).
    OaepDecodeFailed,
    /// Le plaintext déchiffré n'a pas le format attendu
    /// (trop court pour le suffixe de hachage, indice de fonction hors plage…)
    MalformedPayload,
    /// Le plaintext libéré n'est pas une chaîne UTF-8 valide
    Utf8DecodeFailed,

    // --- Erreurs de stockage / parsing des clés ---
    /// Parsing hexadécimal invalide dans un champ de clé JSON
    HexParseError,
    /// Champ hex trop long : vecteur DoS potentiel (conversion BigUint coûteuse)
    HexFieldTooLong { actual: usize, maximum: usize },
    /// n != p*q au chargement : fichier corrompu ou falsifié
    KeyCoherenceError,
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::MessageTooLong { length, maximum } =>
                write!(f, "Message de {length} octets trop long pour OAEP (maximum : {maximum} octets)"),
            CryptoError::CiphertextOutOfRange =>
                write!(f, "Le chiffré doit faire exactement la taille du module et représenter un entier < n"),
            CryptoError::KeySizeTooSmall { requested, minimum } =>
                write!(f, "Taille de clé {requested} bits insuffisante, minimum requis : {minimum} bits"),
            CryptoError::NoModularInverse =>
                write!(f, "Impossible de calculer l'inverse modulaire (gcd != 1)"),
            CryptoError::NegativeConversion =>
                write!(f, "Conversion interne BigInt -> BigUint : résultat négatif inattendu"),
            CryptoError::OaepDecodeFailed =>
                write!(f, "Échec du décodage OAEP"),
            CryptoError::MalformedPayload =>
                write!(f, "Plaintext déchiffré au format invalide"),
            CryptoError::Utf8DecodeFailed =>
                write!(f, "Le plaintext libéré n'est pas de l'UTF-8 valide"),
            CryptoError::HexParseError =>
                write!(f, "Parsing hexadécimal invalide dans le fichier de clés"),
            CryptoError::HexFieldTooLong { actual, maximum } =>
                write!(f, "Champ hexadécimal trop long : {actual} caractères (maximum autorisé : {maximum})"),
            CryptoError::KeyCoherenceError =>
                write!(f, "Fichier de clés incohérent : n != p*q (corrompu ou falsifié)"),
        }
    }
}

impl std::error::Error for CryptoError {}
