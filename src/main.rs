// =========================================================
// Démonstrations — Attaques MIA contre PSI & pipeline GCMS
// (avec choix interactif)
// =========================================================

// ── Moteurs d'attaque ─────────────────────────────────────
use anonpsi_crypto::attacks::actbayesian::actbayesian::actbayesian;
use anonpsi_crypto::attacks::baseline::baseline::baseline_attack_with_limited_call;
use anonpsi_crypto::attacks::baseline::improved_baseline::improved_baseline_attack_with_limited_call;
use anonpsi_crypto::attacks::dynpathblizer::dynpathblizer::dynpathblizer;
use anonpsi_crypto::attacks::dynpathblizer::dynpathblizer_params::LeakageMemo;
use anonpsi_crypto::attacks::treesumexplorer::sum_only::improved_attack_with_sum_only;
use anonpsi_crypto::attacks::treesumexplorer::treesumexplorer::psi_sum_attack;

// ── Oracles ───────────────────────────────────────────────
use anonpsi_crypto::oracle::{psi_cardinality, psi_sum, psi_sum_int};

// ── Volet LDP ─────────────────────────────────────────────
use anonpsi_crypto::gcms::gcms_client::on_device_ldp_algorithm;
use anonpsi_crypto::gcms::gcms_server::GcmsServer;
use anonpsi_crypto::gcms::gcms_shuffler::shuffle;
use anonpsi_crypto::gcms::gcms_utils::GcmsParams;
use anonpsi_crypto::unknown_domain::unknown_domain_aux_server::{
    ThresholdParams, UnknownDomainAuxServer,
};
use anonpsi_crypto::unknown_domain::unknown_domain_client::on_device_algorithm;
use anonpsi_crypto::unknown_domain::unknown_domain_server::UnknownDomainServer;

// ── Gestion des clés ──────────────────────────────────────
use anonpsi_crypto::key_management::{
    ensure_keys_directory, key_file_exists, load_keypair_json, save_keypair_json,
    save_public_key_json,
};
use anonpsi_crypto::rsa_oaep::r_keygen::r_keygen::r_keygen;

// ── Types et erreurs ──────────────────────────────────────
use anonpsi_crypto::CryptoError;
use anonpsi_crypto::KeyPair;

// ── Stdlib & crates externes ──────────────────────────────
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashSet;
use std::io::{self, Write};
use std::time::Instant;

// ── Chemins des fichiers de clés ──────────────────────────
const KEYS_DIR: &str = "keys";
const SERVER_KEYPAIR_PATH: &str = "keys/rsa_server_keypair.json";
const SERVER_PUBLIC_KEY_PATH: &str = "keys/rsa_server_public_key.json";
const AUX_KEYPAIR_PATH: &str = "keys/rsa_aux_keypair.json";

// ─────────────────────────────────────────────────────────
// Erreur applicative centrale
//
// Unifie CryptoError et io::Error pour propager toutes les
// erreurs via ? sans conversion manuelle.
// ─────────────────────────────────────────────────────────

#[derive(Debug)]
enum AppError {
    Crypto(CryptoError),
    Io(std::io::Error),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Crypto(e) => write!(f, "Erreur cryptographique : {}", e),
            AppError::Io(e) => write!(f, "Erreur I/O : {}", e),
        }
    }
}

impl From<CryptoError> for AppError {
    fn from(e: CryptoError) -> Self {
        AppError::Crypto(e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Io(e)
    }
}

// ─────────────────────────────────────────────────────────
// Point d'entrée
// ─────────────────────────────────────────────────────────

fn main() {
    if let Err(e) = ensure_keys_directory(KEYS_DIR) {
        eprintln!("[FATAL] Impossible de créer le répertoire keys/ : {}", e);
        std::process::exit(1);
    }

    loop {
        afficher_menu();
        let choix = lire_choix();

        let res = match choix.as_str() {
            "1" => demonstration_attaques(),
            "2" => demonstration_gcms(),
            "3" => demonstration_domaine_inconnu(),
            "4" => {
                println!("\nAu revoir !\n");
                break;
            }
            _ => {
                println!("\nChoix invalide. Veuillez choisir 1, 2, 3 ou 4.\n");
                continue;
            }
        };

        if let Err(e) = res {
            eprintln!("\n[ERREUR] {}\n", e);
        }

        println!("\nAppuyez sur Entrée pour continuer...");
        let mut pause = String::new();
        io::stdin().read_line(&mut pause).ok();
    }
}

// ─────────────────────────────────────────────────────────
// Menu
// ─────────────────────────────────────────────────────────

fn afficher_menu() {
    println!("\n╔═══════════════════════════════════════════════╗");
    println!("║   ANONPSI & GCMS — MENU                       ║");
    println!("╚═══════════════════════════════════════════════╝");
    println!("\n  [1] Attaques par inférence d'appartenance (PSI)");
    println!("  [2] Estimation de fréquence GCMS (shuffle-LDP)");
    println!("  [3] Collecte à domaine inconnu (deux serveurs)");
    println!("  [4] Quitter\n");
    print!("Votre choix : ");
    io::stdout().flush().ok();
}

fn lire_choix() -> String {
    let mut input = String::new();
    io::stdin().read_line(&mut input).ok();
    input.trim().to_string()
}

// ─────────────────────────────────────────────────────────
// Gestion des clés : chargement ou génération + sauvegarde
// ─────────────────────────────────────────────────────────

fn charger_ou_generer_cles(keypair_path: &str, bits: u64) -> Result<KeyPair, AppError> {
    if key_file_exists(keypair_path) {
        println!("\n  Clés existantes détectées ({}) — chargement...", keypair_path);
        let t = Instant::now();
        match load_keypair_json(keypair_path) {
            Ok(kp) => {
                if kp.public_key.n.bits() == bits {
                    println!("  Clés chargées depuis le disque ({:.3?})\n", t.elapsed());
                    return Ok(kp);
                }
                println!("  Taille inattendue ({} bits) — regénération...", kp.public_key.n.bits());
            }
            Err(e) => println!("  Erreur de chargement ({}) — regénération...", e),
        }
    } else {
        println!("\n  Aucune clé trouvée — génération RSA ({} bits)...", bits);
    }

    let t = Instant::now();
    let keypair = r_keygen(bits)?;
    println!("  Clés générées ({} bits) — temps : {:.3?}", bits, t.elapsed());
    save_keypair_json(&keypair, keypair_path)?;
    println!("  Clés sauvegardées dans {}\n", keypair_path);
    Ok(keypair)
}

// ─────────────────────────────────────────────────────────
// Génération d'ensembles synthétiques à intersection imposée
// ─────────────────────────────────────────────────────────

fn generer_ensembles_avec_intersection(
    victim_set_num: usize,
    target_set_num: usize,
    dense: usize,
    intersection_num: usize,
    rng: &mut StdRng,
) -> (HashSet<u64>, HashSet<u64>) {
    let upper = (victim_set_num.max(target_set_num) * dense) as u64;
    let mut pool: Vec<u64> = (0..upper).collect();
    pool.shuffle(rng);

    let intersection = &pool[..intersection_num];
    let victim_only = &pool[intersection_num..victim_set_num];
    let target_only = &pool[victim_set_num..victim_set_num + target_set_num - intersection_num];

    let victim_x: HashSet<u64> = victim_only.iter().chain(intersection).copied().collect();
    let target_y: HashSet<u64> = target_only.iter().chain(intersection).copied().collect();
    (victim_x, target_y)
}

// ─────────────────────────────────────────────────────────
// [1] Démonstration des moteurs d'attaque
// ─────────────────────────────────────────────────────────

fn demonstration_attaques() -> Result<(), AppError> {
    println!("\n==============================================");
    println!("    Attaques MIA contre PSI — Démonstration");
    println!("==============================================");

    let victim_set_size = 20usize;
    let target_set_size = 20usize;
    let intersection_num = 10usize;
    let tau = 10usize;

    let mut rng = StdRng::seed_from_u64(2023);
    let (victim_x, target_y) =
        generer_ensembles_avec_intersection(victim_set_size, target_set_size, 2, intersection_num, &mut rng);

    println!("\n  |X| = {}, |Y| = {}, |X ∩ Y| = {}, τ = {}", victim_x.len(), target_y.len(), intersection_num, tau);

    println!("\n  Pré-calcul des tables (γ, φ) jusqu'à n = {}...", victim_set_size);
    let t = Instant::now();
    let memo = LeakageMemo::build(victim_set_size);
    println!("  Tables construites en {:.3?}", t.elapsed());

    // Attaque de référence
    let t = Instant::now();
    let (z_pos, z_neg) =
        baseline_attack_with_limited_call(&victim_x, |a| psi_cardinality(a, &target_y), tau, &mut rng);
    println!("\n  Référence (USENIX22)      : fuite = {:2}  ({:.3?})", z_pos.len() + z_neg.len(), t.elapsed());

    // Référence améliorée
    let t = Instant::now();
    let (z_pos, z_neg) = improved_baseline_attack_with_limited_call(
        &victim_x,
        |a| psi_cardinality(a, &target_y),
        tau,
        &mut rng,
    );
    println!("  Référence améliorée       : fuite = {:2}  ({:.3?})", z_pos.len() + z_neg.len(), t.elapsed());

    // Dynpathblizer
    let t = Instant::now();
    let (z_pos, z_neg) =
        dynpathblizer(&victim_x, |a| psi_cardinality(a, &target_y), tau, &memo, &mut rng);
    println!("  Dynpathblizer (DP)        : fuite = {:2}  ({:.3?})", z_pos.len() + z_neg.len(), t.elapsed());

    // TreeSumExplorer sur le volet entier
    let victim_int: HashSet<i64> = victim_x.iter().map(|&v| v as i64).collect();
    let target_int: HashSet<i64> = target_y.iter().map(|&v| v as i64).collect();
    let t = Instant::now();
    let (z_pos, z_neg) = psi_sum_attack(
        &victim_int,
        |a| psi_sum_int(a, &target_int),
        tau as i64,
        1e10,
        &mut rng,
    );
    println!("  TreeSumExplorer (n-sum)   : fuite = {:2}  ({:.3?})", z_pos.len() + z_neg.len(), t.elapsed());

    // Canal somme seul, sur paires (id, valeur)
    let victim_pairs: HashSet<(u64, i64)> = victim_x.iter().map(|&v| (v, 1 + v as i64)).collect();
    let target_pairs: HashSet<(u64, i64)> = target_y.iter().map(|&v| (v, 1 + v as i64)).collect();
    let t = Instant::now();
    let (z_pos, z_neg) = improved_attack_with_sum_only(
        &victim_pairs,
        |a| psi_sum(a, &target_pairs),
        tau,
        &mut rng,
    );
    println!("  Canal somme seul          : fuite = {:2}  ({:.3?})", z_pos.len() + z_neg.len(), t.elapsed());

    // ActBayesian sur le vecteur binaire d'appartenance
    let mut dataset: Vec<u8> = victim_x.iter().map(|v| target_y.contains(v) as u8).collect();
    dataset.shuffle(&mut rng);
    let t = Instant::now();
    let outcome = actbayesian(tau as i64, 0.25, 0.8, &dataset, 0.1, 0.0, 0.5, &mut rng);
    println!(
        "  ActBayesian               : fuite = {:2}  (erreurs +{} / -{})  ({:.3?})",
        outcome.true_pos_leak + outcome.true_neg_leak,
        outcome.pos_err,
        outcome.neg_err,
        t.elapsed()
    );

    Ok(())
}

// ─────────────────────────────────────────────────────────
// [2] Démonstration GCMS — estimation de fréquence
// ─────────────────────────────────────────────────────────

fn demonstration_gcms() -> Result<(), AppError> {
    println!("\n==============================================");
    println!("    GCMS (shuffle-LDP) — Démonstration");
    println!("==============================================");

    let params = GcmsParams {
        k: 1000,
        m: 1024,
        s: 56,
        p: 0.5,
    };
    println!("\n  k = {}, m = {}, s = {}, p = {}", params.k, params.m, params.s, params.p);
    println!("  ε dérivé = {:.4}", params.epsilon());

    let keypair = charger_ou_generer_cles(SERVER_KEYPAIR_PATH, 2048)?;
    save_public_key_json(&keypair.public_key, SERVER_PUBLIC_KEY_PATH)?;

    let mut data: Vec<Option<String>> = Vec::new();
    data.extend(std::iter::repeat(Some("123".to_string())).take(100));
    data.extend(std::iter::repeat(Some("456".to_string())).take(50));
    data.extend(std::iter::repeat(Some("789".to_string())).take(25));
    data.push(None); // valeur manquante, ignorée par le client

    // 1. Les clients privatisent et chiffrent leurs messages
    let t = Instant::now();
    let batch = on_device_ldp_algorithm(params.k, params.m, &data, params.s, params.p, &keypair.public_key)?;
    println!("\n  [1] Client    : {} messages privatisés et chiffrés ({:.3?})", batch.encrypted_messages.len(), t.elapsed());

    // 2. Le mélangeur applique une permutation uniforme
    let t = Instant::now();
    let shuffled = shuffle(&batch.encrypted_messages);
    println!("  [2] Mélangeur : permutation uniforme appliquée ({:.3?})", t.elapsed());

    // 3. Le serveur déchiffre, agrège, estime
    let mut server = GcmsServer::new(params.k, params.m, keypair);
    let t = Instant::now();
    let (plaintexts, hash_indexes) = server.decrypt_message(&shuffled)?;
    println!("  [3] Serveur   : {} messages déchiffrés ({:.3?})", plaintexts.len(), t.elapsed());

    server.construct_sketch_matrix(&plaintexts, &hash_indexes);
    for message in ["123", "456", "789"] {
        let estimate = server.estimate_frequency(message, params.p, params.s);
        println!("      f̂({}) = {:8.2}", message, estimate);
    }

    Ok(())
}

// ─────────────────────────────────────────────────────────
// [3] Démonstration domaine inconnu — deux serveurs
// ─────────────────────────────────────────────────────────

fn demonstration_domaine_inconnu() -> Result<(), AppError> {
    println!("\n==============================================");
    println!("  Collecte à domaine inconnu — Démonstration");
    println!("==============================================");

    let server_kp = charger_ou_generer_cles(SERVER_KEYPAIR_PATH, 2048)?;
    let aux_kp = charger_ou_generer_cles(AUX_KEYPAIR_PATH, 3072)?;

    let mut data: Vec<String> = Vec::new();
    data.extend(std::iter::repeat("123".to_string()).take(100));
    data.extend(std::iter::repeat("456".to_string()).take(50));
    data.extend(std::iter::repeat("789".to_string()).take(25));

    let params = ThresholdParams {
        epsilon: 0.1,
        delta: 1.0 / (10.0 * data.len() as f64),
    };
    println!("\n  ε = {}, δ = {:.5}, T = {:.2}", params.epsilon, params.delta, params.threshold());

    // 1. Double chiffrement côté client
    let t = Instant::now();
    let encrypted = on_device_algorithm(&data, &server_kp.public_key, &aux_kp.public_key)?;
    println!("\n  [1] Client     : {} messages doublement chiffrés ({:.3?})", encrypted.len(), t.elapsed());

    // 2. Mélange
    let shuffled = shuffle(&encrypted);
    println!("  [2] Mélangeur  : permutation uniforme appliquée");

    // 3. Seuillage DP au serveur auxiliaire
    let aux_server = UnknownDomainAuxServer::new(aux_kp);
    let t = Instant::now();
    let released = aux_server.dp_protection(&shuffled, params.threshold(), params.scale())?;
    println!("  [3] Auxiliaire : {} groupe(s) au-dessus du seuil ({:.3?})", released.len(), t.elapsed());

    // 4. Déchiffrement final
    let server = UnknownDomainServer::new(server_kp);
    let result = server.decrypt_message(&released)?;
    println!("  [4] Serveur    : vocabulaire libéré = {:?}", result);

    Ok(())
}
