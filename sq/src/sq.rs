//! A command-line frontend for OpenPGP.

use std::fs::OpenOptions;
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::Context as _;
use log::debug;

use openpgp::armor;
use openpgp::cert::{Cert, GenerateRequest};
use openpgp::context::{Context, Operation, PasswordProvider, PasswordRecipient};
use openpgp::crypto::mem::Protected;
use openpgp::key_store::transferable;
use openpgp::packet::key::Key4;
use openpgp::packet::Packet;
use openpgp::parse::Parse;
use openpgp::serialize::Marshal;
use openpgp::types::{CompressionAlgorithm, DataFormat, SymmetricAlgorithm};
use openpgp::{Error, PacketPile, Result};
use rpgp_core as openpgp;

mod config;
mod sq_cli;

use config::Config;

fn open_or_stdin(f: Option<&str>) -> Result<Box<dyn io::Read>> {
    match f {
        Some(f) => Ok(Box::new(
            std::fs::File::open(f).context(format!("Failed to open {:?}", f))?,
        )),
        None => Ok(Box::new(io::stdin())),
    }
}

fn create_or_stdout(f: Option<&str>, force: bool) -> Result<Box<dyn io::Write>> {
    match f {
        None | Some("-") => Ok(Box::new(io::stdout())),
        Some(f) => {
            let p = Path::new(f);
            if p.exists() && !force {
                return Err(anyhow::anyhow!(
                    "File {:?} exists, use --force to overwrite",
                    p
                ));
            }
            Ok(Box::new(
                OpenOptions::new()
                    .write(true)
                    .truncate(true)
                    .create(true)
                    .open(f)
                    .context("Failed to create output file")?,
            ))
        }
    }
}

fn read_all(mut input: Box<dyn io::Read>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    input.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Dearmors `data` if it looks armored, otherwise returns it as-is.
fn dearmor(data: Vec<u8>) -> Result<Vec<u8>> {
    if !data.starts_with(b"-----") {
        return Ok(data);
    }
    let mut reader = armor::Reader::from_bytes(&data, None);
    let mut out = Vec::new();
    reader
        .read_to_end(&mut out)
        .map_err(|e| Error::MalformedArmor(e.to_string()))?;
    Ok(out)
}

fn read_packets(input: Box<dyn io::Read>) -> Result<Vec<Packet>> {
    let data = dearmor(read_all(input)?)?;
    Ok(PacketPile::from_bytes(&data)?.into_children().collect())
}

/// Serializes `packets` to `output`, ASCII-armoring unless `binary`.
fn write_message(
    output: Box<dyn io::Write>,
    binary: bool,
    kind: armor::Kind,
    packets: &[Packet],
) -> Result<()> {
    if binary {
        let mut out = output;
        for p in packets {
            p.serialize(&mut out)?;
        }
        Ok(())
    } else {
        let mut writer = armor::Writer::new(output, kind)?;
        for p in packets {
            p.serialize(&mut writer)?;
        }
        writer.finalize()?;
        Ok(())
    }
}

/// Loads every certificate found in the given files.
fn load_certs<'a, I: Iterator<Item = &'a str>>(files: I) -> Result<Vec<Cert>> {
    let mut certs = Vec::new();
    for f in files {
        let data = std::fs::read(f).context(format!("Failed to read {:?}", f))?;
        certs.extend(
            transferable::read_certs(&data).context(format!("Failed to parse certs in {:?}", f))?,
        );
    }
    Ok(certs)
}

/// Loads one or more transferable secret keys from the given files.
fn load_keys<'a, I: Iterator<Item = &'a str>>(files: I) -> Result<Vec<Cert>> {
    let mut certs = Vec::new();
    for f in files {
        let data = std::fs::read(f).context(format!("Failed to read {:?}", f))?;
        for cert in transferable::read_certs(&data)? {
            if !cert.is_tsk() {
                return Err(anyhow::anyhow!(
                    "{:?} does not contain secret key material",
                    f
                ));
            }
            certs.push(cert);
        }
    }
    Ok(certs)
}

/// Picks the newest live key (primary or subkey) from `cert` whose
/// binding signature's key flags satisfy `capable`.
fn find_key<'a>(
    cert: &'a Cert,
    capable: impl Fn(&openpgp::types::KeyFlags) -> bool,
) -> Option<&'a Key4> {
    let mut best: Option<(&'a Key4, std::time::SystemTime)> = None;
    let mut consider = |key: &'a Key4, flags: Option<openpgp::types::KeyFlags>| {
        let Some(flags) = flags else { return };
        if !capable(&flags) {
            return;
        }
        let creation = key.creation_time();
        if best.map(|(_, t)| creation > t).unwrap_or(true) {
            best = Some((key, creation));
        }
    };

    if let Some(uid) = cert.primary_userid() {
        let flags = uid
            .self_signatures()
            .iter()
            .rev()
            .find_map(|s| s.hashed_area().key_flags());
        consider(cert.primary_key(), flags);
    }
    for sk in cert.subkeys() {
        let flags = sk
            .binding_signature()
            .and_then(|s| s.hashed_area().key_flags());
        consider(sk.key(), flags);
    }

    best.map(|(k, _)| k)
}

fn find_signing_key(cert: &Cert) -> Result<Key4> {
    find_key(cert, |f| f.for_signing())
        .cloned()
        .ok_or_else(|| {
            Error::KeyNotFound(format!("{} has no signing-capable key", cert.fingerprint())).into()
        })
}

/// Unlocks `key` if it is still protected, trying `passwords` first
/// and falling back to an interactive prompt; a password that works
/// is appended to `passwords` so it can be reused for later keys.
fn unlock_key(mut key: Key4, passwords: &mut Vec<String>) -> Result<Key4> {
    if key.is_unlocked() {
        return Ok(key);
    }

    for p in passwords.iter() {
        let mut candidate = key.clone();
        if candidate.unlock(p.as_bytes()).is_ok() {
            return Ok(candidate);
        }
    }

    for attempt in 0..3 {
        let prompt = format!(
            "{}Enter password to unlock {}: ",
            if attempt == 0 { "" } else { "Invalid password. " },
            key.keyid()
        );
        let password = rpassword::prompt_password(prompt).context("Failed to read password")?;
        if password.is_empty() {
            break;
        }
        if key.unlock(password.as_bytes()).is_ok() {
            passwords.push(password);
            return Ok(key);
        }
    }

    Err(Error::BadPassword.into())
}

/// Supplies passphrases for symmetrically-encrypted recipients,
/// trying `--password` (if given) before prompting interactively.
struct CliPasswordProvider {
    passwords: std::cell::RefCell<Vec<String>>,
}

impl PasswordProvider for CliPasswordProvider {
    fn provide_password(&self, operation: Operation, identifier: &str) -> Option<Protected> {
        let mut passwords = self.passwords.borrow_mut();
        if let Some(p) = passwords.first() {
            return Some(p.as_bytes().to_vec().into());
        }
        let prompt = match operation {
            Operation::Unlock => format!("Enter password to unlock {}: ", identifier),
            _ => "Enter password: ".to_string(),
        };
        let password = rpassword::prompt_password(prompt).ok()?;
        if password.is_empty() {
            return None;
        }
        passwords.push(password.clone());
        Some(password.into_bytes().into())
    }
}

fn parse_cipher(s: &str) -> SymmetricAlgorithm {
    match s {
        "aes128" => SymmetricAlgorithm::AES128,
        "aes192" => SymmetricAlgorithm::AES192,
        _ => SymmetricAlgorithm::AES256,
    }
}

fn parse_compression(s: &str) -> Option<CompressionAlgorithm> {
    match s {
        "zip" => Some(CompressionAlgorithm::Zip),
        "zlib" => Some(CompressionAlgorithm::Zlib),
        "bzip2" => Some(CompressionAlgorithm::BZip2),
        _ => None,
    }
}

fn main() -> Result<()> {
    let matches = sq_cli::build().get_matches();

    let verbosity = matches.occurrences_of("verbose");
    env_logger::Builder::new()
        .filter_level(match verbosity {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();

    let force = matches.is_present("force");
    let config = Config::new(matches.value_of("homedir"), force);
    debug!("using homedir {:?}", config.homedir);

    match matches.subcommand() {
        ("generate-key", Some(m)) => {
            let request_json = read_all(open_or_stdin(m.value_of("request"))?)?;
            let request_json = String::from_utf8(request_json)
                .context("Key-generation request is not valid UTF-8")?;
            let request = GenerateRequest::from_json(&request_json)
                .context("Failed to parse key-generation request")?;
            let (cert, _revocation) = request.build().context("Key generation failed")?;

            eprintln!("Generated {}", cert.fingerprint());
            for key in cert.keys() {
                eprintln!("  {}", key.fingerprint());
            }

            let mut output = create_or_stdout(m.value_of("output"), force)?;
            if m.is_present("binary") {
                transferable::write_certs(&mut output, std::iter::once(&cert))?;
            } else {
                transferable::write_certs_armored(
                    &mut output,
                    armor::Kind::SecretKey,
                    std::iter::once(&cert),
                )?;
            }
        }

        ("sign", Some(m)) => {
            let data = dearmor(read_all(open_or_stdin(m.value_of("input"))?)?)?;
            let binary = m.is_present("binary");
            let detached = m.is_present("detached");

            let mut passwords = Vec::new();
            let ctx = Context::new();
            let signers: Vec<(Cert, Key4)> =
                load_keys(m.values_of("secret-key-file").expect("required"))?
                    .into_iter()
                    .map(|cert| -> Result<(Cert, Key4)> {
                        let key = find_signing_key(&cert)?;
                        let key = unlock_key(key, &mut passwords)?;
                        Ok((cert, key))
                    })
                    .collect::<Result<_>>()?;
            let signer_refs: Vec<(&Cert, &Key4)> = signers.iter().map(|(c, k)| (c, k)).collect();

            let output = create_or_stdout(m.value_of("output"), force)?;
            if detached {
                let (cert, key) = signers
                    .first()
                    .ok_or_else(|| anyhow::anyhow!("No --secret-key-file given"))?;
                let sig = ctx.sign_detached(cert, key, &data)?;
                write_message(output, binary, armor::Kind::Signature, &[Packet::from(sig)])?;
            } else {
                let packets = ctx.sign_inline(&signer_refs, &data, DataFormat::Binary)?;
                write_message(output, binary, armor::Kind::Message, &packets)?;
            }
        }

        ("verify", Some(m)) => {
            let certs = load_certs(m.values_of("sender-cert-file").expect("required"))?;
            let mut ctx = Context::new();
            ctx.add_certs(certs);

            let mut output = create_or_stdout(m.value_of("output"), force)?;
            if let Some(sig_file) = m.value_of("detached") {
                let data = dearmor(read_all(open_or_stdin(m.value_of("input"))?)?)?;
                let sig_bytes = dearmor(std::fs::read(sig_file)?)?;
                let sig_packets: Vec<Packet> =
                    PacketPile::from_bytes(&sig_bytes)?.into_children().collect();
                let sig = sig_packets
                    .into_iter()
                    .find_map(|p| match p {
                        Packet::Signature(s) => Some(s),
                        _ => None,
                    })
                    .ok_or_else(|| anyhow::anyhow!("No signature packet in {:?}", sig_file))?;
                ctx.verify_detached(&sig, &data)?;
                output.write_all(&data)?;
                eprintln!("Good signature.");
            } else {
                let packets = read_packets(open_or_stdin(m.value_of("input"))?)?;
                let data = ctx.verify_inline(&packets)?;
                output.write_all(&data)?;
                eprintln!("Good signature.");
            }
        }

        ("encrypt", Some(m)) => {
            let data = dearmor(read_all(open_or_stdin(m.value_of("input"))?)?)?;
            let binary = m.is_present("binary");

            let recipients = load_certs(m.values_of("recipients-cert-file").unwrap_or_default())?;
            let recipient_refs: Vec<&Cert> = recipients.iter().collect();

            let passwords: Vec<&str> = m.values_of("symmetric").unwrap_or_default().collect();

            let mut unlock_passwords = Vec::new();
            let signers: Vec<(Cert, Key4)> =
                load_keys(m.values_of("signer-key-file").unwrap_or_default())?
                    .into_iter()
                    .map(|cert| -> Result<(Cert, Key4)> {
                        let key = find_signing_key(&cert)?;
                        let key = unlock_key(key, &mut unlock_passwords)?;
                        Ok((cert, key))
                    })
                    .collect::<Result<_>>()?;
            let signer_refs: Vec<(&Cert, &Key4)> = signers.iter().map(|(c, k)| (c, k)).collect();

            let sym_algo = parse_cipher(m.value_of("cipher").expect("has default"));
            let compression = parse_compression(m.value_of("compression").expect("has default"));

            // The CLI exposes one cipher for the whole operation; it
            // wraps every password's session key and encrypts the
            // message data alike. `Context::encrypt` supports giving
            // each password its own S2K parameters and wrap cipher,
            // for callers that need it.
            let password_recipients: Vec<PasswordRecipient> = passwords.iter()
                .map(|p| PasswordRecipient::new(p.as_bytes()).with_cipher(sym_algo))
                .collect();

            let ctx = Context::new();
            let packets = ctx.encrypt(
                &recipient_refs,
                &password_recipients,
                &signer_refs,
                &data,
                DataFormat::Binary,
                sym_algo,
                compression,
            )?;

            let output = create_or_stdout(m.value_of("output"), force)?;
            write_message(output, binary, armor::Kind::Message, &packets)?;
        }

        ("decrypt", Some(m)) => {
            let packets = read_packets(open_or_stdin(m.value_of("input"))?)?;

            let secrets = load_keys(m.values_of("secret-key-file").unwrap_or_default())?;

            let mut ctx = Context::new();
            ctx.add_certs(secrets);

            let provider = CliPasswordProvider {
                passwords: std::cell::RefCell::new(
                    m.value_of("password")
                        .map(|p| vec![p.to_string()])
                        .unwrap_or_default(),
                ),
            };
            ctx.set_password_provider(Box::new(provider));

            let plaintext = ctx.decrypt(&packets)?;
            let mut output = create_or_stdout(m.value_of("output"), force)?;
            output.write_all(&plaintext)?;
        }

        ("list-keys", Some(m)) => {
            let certs = load_certs(m.values_of("input").unwrap_or_default())?;
            for cert in &certs {
                let uid = cert
                    .primary_userid()
                    .map(|u| String::from_utf8_lossy(u.userid().value()).into_owned())
                    .unwrap_or_default();
                println!("{}  {}", cert.fingerprint(), uid);
                for key in cert.subkeys() {
                    println!("    {}  ({:?})", key.key().fingerprint(), key.key().pk_algo());
                }
            }
        }

        _ => unreachable!(),
    }

    Ok(())
}
