use std::fs::File;
use std::io::{BufReader, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ntru::keyfile::{self, PrivateKeyFile, PublicKeyFile};
use ntru::keygen::{KeyEngine, KeygenObserver};
use ntru::params::Params;
use ntru::{codec, KeyPair, RingElement};

#[derive(Parser)]
#[command(name = "ntru", about = "NTRU lattice-based public-key cryptosystem")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a key pair and write `<name>.pub` / `<name>.priv`.
    Keygen {
        #[arg(long, default_value = "highest")]
        mode: String,
        #[arg(long, default_value = "key")]
        name: String,
        #[arg(long)]
        skip_health_check: bool,
        #[arg(long)]
        verbose: bool,
    },
    /// Encrypt a message with `<name>.pub`.
    Encrypt {
        #[arg(long, default_value = "key")]
        name: String,
        #[arg(long)]
        message: String,
    },
    /// Decrypt a ciphertext with `<name>.priv`.
    Decrypt {
        #[arg(long, default_value = "key")]
        name: String,
        #[arg(long)]
        cipher: String,
    },
}

/// Routes keygen progress through the `log` crate instead of printing
/// directly, so the core stays silent and the CLI decides verbosity.
struct LoggingObserver {
    verbose: bool,
}

impl KeygenObserver for LoggingObserver {
    fn on_fg_attempt(&mut self, attempt: u32) {
        if self.verbose {
            log::debug!("sampling f, attempt {attempt}");
        }
    }

    fn on_fg_success(&mut self, attempt: u32) {
        log::info!("found invertible f after {attempt} attempt(s)");
    }

    fn on_health_check(&mut self, passed: bool) {
        if passed {
            log::info!("public key passed the leading-coefficient health check");
        } else {
            log::warn!("public key failed the leading-coefficient health check, resampling");
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Keygen {
            mode,
            name,
            skip_health_check,
            verbose,
        } => run_keygen(&mode, &name, skip_health_check, verbose),
        Command::Encrypt { name, message } => run_encrypt(&name, &message),
        Command::Decrypt { name, cipher } => run_decrypt(&name, &cipher),
    }
}

fn run_keygen(mode: &str, name: &str, skip_health_check: bool, verbose: bool) -> Result<()> {
    let params = Params::from_mode(mode)?;
    let mut observer = LoggingObserver { verbose };
    let mut engine = KeyEngine::new(params, &mut observer);
    let mut rng = rand::thread_rng();

    log::info!("generating keys in '{mode}' mode");
    let key = engine.generate(&mut rng, skip_health_check)?;

    let report = engine.sparsity_check(&key, 5);
    if report.f_is_sparse() || report.h_is_sparse() {
        log::warn!(
            "generated key looks unusually sparse (f={} h={} nonzero coefficients); advisory only",
            report.f_nonzero,
            report.h_nonzero
        );
    }

    let keyspace = engine.keyspace_check();
    if keyspace.is_secure() {
        log::info!(
            "estimated keyspace: ~2^{:.1} (above the {:.0}-bit meet-in-the-middle threshold)",
            keyspace.bits,
            keyspace.threshold_bits
        );
    } else {
        log::warn!(
            "estimated keyspace ~2^{:.1} falls short of the {:.0}-bit meet-in-the-middle threshold; advisory only",
            keyspace.bits,
            keyspace.threshold_bits
        );
    }

    let pub_file = PublicKeyFile {
        p: params.p,
        q: params.q,
        n: params.n,
        dr: params.dr,
        h: key.h.clone(),
    };
    let priv_file = PrivateKeyFile {
        p: params.p,
        q: params.q,
        n: params.n,
        df: params.df,
        dg: params.dg,
        dr: params.dr,
        f: key.f.clone(),
        fp: key.f_p.clone(),
        fq: key.f_q.clone(),
        g: key.g.clone(),
    };

    let mut pub_out = File::create(format!("{name}.pub")).context("creating public key file")?;
    keyfile::write_public(&mut pub_out, &pub_file)?;

    let mut priv_out = File::create(format!("{name}.priv")).context("creating private key file")?;
    keyfile::write_private(&mut priv_out, &priv_file)?;

    println!("wrote {name}.pub and {name}.priv");
    Ok(())
}

fn run_encrypt(name: &str, message: &str) -> Result<()> {
    let file = File::open(format!("{name}.pub")).context("opening public key file")?;
    let mut reader = BufReader::new(file);
    let pub_file = keyfile::read_public(&mut reader)?;

    // Encryption only needs N, p, q, dr; df/dg play no role in the cipher
    // path, so reuse dr as an arbitrary placeholder that still satisfies
    // Params::custom's weight bound (2*d <= N).
    let params = Params::custom(
        pub_file.n,
        pub_file.p,
        pub_file.q,
        pub_file.dr,
        pub_file.dr,
        pub_file.dr,
    )?;

    let mut rng = rand::thread_rng();
    let ciphertext = codec::encrypt_string(message.as_bytes(), &pub_file.h, &params, &mut rng);
    println!("{ciphertext}");
    Ok(())
}

fn run_decrypt(name: &str, cipher: &str) -> Result<()> {
    let file = File::open(format!("{name}.priv")).context("opening private key file")?;
    let mut reader = BufReader::new(file);
    let priv_file = keyfile::read_private(&mut reader)?;

    let params = Params::custom(
        priv_file.n,
        priv_file.p,
        priv_file.q,
        priv_file.df,
        priv_file.dg,
        priv_file.dr,
    )?;
    let key = KeyPair {
        f: priv_file.f,
        f_p: priv_file.fp,
        f_q: priv_file.fq,
        g: priv_file.g,
        h: RingElement::new(vec![0; priv_file.n]),
    };

    let plaintext = codec::decrypt_string(cipher, &key, &params)?;
    std::io::stdout()
        .write_all(&plaintext)
        .context("writing decrypted message")?;
    println!();
    Ok(())
}
