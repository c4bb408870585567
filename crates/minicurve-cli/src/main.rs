use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use log::info;
use minicurve_arith::{Curve, Domain, Point, SearchLimits};
use minicurve_protocol::{find_generator, Ecdsa, KeyAgreement, KeyPair, PrivateKey, Signature};
use num_bigint::BigUint;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;

/// Default non-residue draws before giving up on a square root
const DEFAULT_MAX_DRAWS: u32 = 1_000;

#[derive(Parser, Debug)]
#[command(
    name = "minicurve",
    about = "Toy prime-field elliptic curves: group arithmetic, ECDSA and ECDH"
)]
struct Cli {
    #[command(flatten)]
    domain: DomainArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct DomainArgs {
    /// Curve parameters "a,b,q" for y² = x³ + ax + b (mod q)
    #[arg(long = "curve", global = true, default_value = "2,3,97")]
    curve: CurveArg,

    /// Generator point "x,y"
    #[arg(long = "generator", global = true, default_value = "3,6")]
    generator: PointArg,

    /// Maximum random draws when searching for a quadratic non-residue
    #[arg(long = "max-draws", global = true, default_value_t = DEFAULT_MAX_DRAWS)]
    max_draws: u32,

    /// Maximum multiples examined when computing a point's order
    #[arg(long = "max-scan", global = true)]
    max_scan: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the two points with the given x-coordinate
    Points {
        #[arg(long = "x")]
        x: BigUint,
    },
    /// Order of a point
    Order {
        #[arg(long = "point")]
        point: PointArg,
    },
    /// Find the point of largest order on the curve
    Generator {
        #[arg(long = "min-order", default_value = "2")]
        min_order: BigUint,
    },
    /// Derive a public key (random private key if none given)
    Keygen {
        #[arg(long = "private")]
        private: Option<BigUint>,
    },
    /// Sign a message
    Sign {
        #[arg(long = "private")]
        private: BigUint,
        #[arg(short = 'm', long = "message")]
        message: String,
        /// Fixed nonce, for reproducible output only; never reuse one
        #[arg(long = "ephemeral")]
        ephemeral: Option<BigUint>,
    },
    /// Verify a signature
    Verify {
        #[arg(long = "public")]
        public: PointArg,
        #[arg(short = 'm', long = "message")]
        message: String,
        /// Signature "r,s"
        #[arg(long = "signature")]
        signature: SignatureArg,
    },
    /// Derive a shared secret and symmetric key with a peer
    Shared {
        #[arg(long = "private")]
        private: BigUint,
        #[arg(long = "peer")]
        peer: PointArg,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct CurveArg {
    a: BigUint,
    b: BigUint,
    q: BigUint,
}

impl FromStr for CurveArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse_list(s, 3)?.as_slice() {
            [a, b, q] => Ok(Self {
                a: a.clone(),
                b: b.clone(),
                q: q.clone(),
            }),
            _ => Err(format!("expected 'a,b,q', got '{s}'")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct PointArg(Point);

impl FromStr for PointArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("o") {
            return Ok(Self(Point::Identity));
        }
        match parse_list(s, 2)?.as_slice() {
            [x, y] => Ok(Self(Point::new(x.clone(), y.clone()))),
            _ => Err(format!("expected 'x,y', got '{s}'")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct SignatureArg(Signature);

impl FromStr for SignatureArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse_list(s, 2)?.as_slice() {
            [r, s] => Ok(Self(Signature::new(r.clone(), s.clone()))),
            _ => Err(format!("expected 'r,s', got '{s}'")),
        }
    }
}

/// Parse exactly `count` comma-separated decimal integers.
fn parse_list(s: &str, count: usize) -> Result<Vec<BigUint>, String> {
    let values = s
        .split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<BigUint>()
                .map_err(|_| format!("'{part}' is not a non-negative integer"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if values.len() != count {
        return Err(format!(
            "expected {count} comma-separated integers, got {}",
            values.len()
        ));
    }
    Ok(values)
}

/// Message digest as an integer: SHA-256, read big-endian.
fn hash_message(message: &str) -> BigUint {
    BigUint::from_bytes_be(&Sha256::digest(message.as_bytes()))
}

/// Symmetric key from a shared x-coordinate: SHA-256 of its big-endian bytes.
fn derive_key(x: &BigUint) -> [u8; 32] {
    Sha256::digest(x.to_bytes_be()).into()
}

impl DomainArgs {
    fn limits(&self) -> SearchLimits {
        let limits = SearchLimits::default().with_max_draws(self.max_draws);
        match self.max_scan {
            Some(scan) => limits.with_max_order_scan(scan),
            None => limits,
        }
    }

    fn curve(&self) -> anyhow::Result<Curve> {
        let CurveArg { a, b, q } = self.curve.clone();
        Curve::new(a, b, q).context("invalid curve")
    }

    fn domain(&self) -> anyhow::Result<Arc<Domain>> {
        let curve = self.curve()?;
        let domain = Domain::with_limits(curve, self.generator.0.clone(), self.limits())
            .context("invalid generator")?;
        let order = domain.order().context("cannot determine generator order")?;
        info!("domain {} G={} n={}", domain.curve(), domain.generator(), order);
        Ok(Arc::new(domain))
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let args = &cli.domain;

    match cli.command {
        Command::Points { x } => {
            let curve = args.curve()?;
            let (p, mp) = curve
                .points_at_with(&x, &mut OsRng, &args.limits())
                .with_context(|| format!("no point on {curve} at x = {x}"))?;
            println!("{p}");
            println!("{mp}");
        }

        Command::Order { point } => {
            let curve = args.curve()?;
            let order = curve
                .order_within(&point.0, &args.limits())
                .with_context(|| format!("order of {}", point.0))?;
            println!("{order}");
        }

        Command::Generator { min_order } => {
            let curve = args.curve()?;
            let found = find_generator(&curve, &min_order, &mut OsRng)?;
            println!("Generator: {}", found.point);
            println!("Order:     {}", found.order);
        }

        Command::Keygen { private } => {
            let domain = args.domain()?;
            let private = match private {
                Some(d) => PrivateKey::new(d, &domain)?,
                None => PrivateKey::random(&domain, &mut OsRng)?,
            };
            let pair = KeyPair::from_private(&domain, private);
            println!("Private: {}", pair.private_key().scalar());
            println!("Public:  {}", pair.public_key());
        }

        Command::Sign {
            private,
            message,
            ephemeral,
        } => {
            let ecdsa = Ecdsa::new(args.domain()?);
            let hash = hash_message(&message);
            let signature = match ephemeral {
                Some(k) => ecdsa.sign(&hash, &private, &k)?,
                None => ecdsa.sign_with_rng(&hash, &private, &mut OsRng)?,
            };
            println!("Public:    {}", ecdsa.public_key(&private)?);
            println!("Signature: {},{}", signature.r, signature.s);
        }

        Command::Verify {
            public,
            message,
            signature,
        } => {
            let ecdsa = Ecdsa::new(args.domain()?);
            let hash = hash_message(&message);
            if ecdsa.verify(&hash, &signature.0, &public.0)? {
                println!("Message verified to be authentic.");
            } else {
                println!("Message not authentic!");
                return Ok(ExitCode::FAILURE);
            }
        }

        Command::Shared { private, peer } => {
            let ecdh = KeyAgreement::new(args.domain()?);
            let secret = ecdh.shared_secret(&private, &peer.0)?;
            let Some(x) = secret.x() else {
                bail!("shared point is the identity");
            };
            println!("Shared x: {x}");
            println!("Key:      {}", hex::encode(derive_key(x)));
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(2)
        }
    }
}
