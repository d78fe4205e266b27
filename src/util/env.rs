//! Process configuration, read once from the environment (and `.env`).
//!
//! Values arrive as `(name, value)` string pairs, so [`EnvValue`] re-parses them into whatever
//! type the target field asks for. Field names follow `SCREAMING_SNAKE_CASE`.

use std::iter::empty;
use std::sync::LazyLock;

use serde::Deserialize;
use serde::de::value::{MapDeserializer, SeqDeserializer};
use serde::de::{self, IntoDeserializer};
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::constants;

static ENV_VARS: LazyLock<OnceCell<Env>> = LazyLock::new(OnceCell::new);
pub async fn env() -> EnvResult<&'static Env> {
    ENV_VARS.get_or_try_init(|| async { Env::new() }).await
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Env {
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,
    pub jwt_secret: String,
    #[serde(default = "default_api_port")]
    pub server_api_port: u16,
    #[serde(default = "default_cors_origins")]
    pub cors_allow_origins: String,
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    pub openrouter_api_key: Option<String>,
    #[serde(default = "default_openrouter_model")]
    pub openrouter_model: String,
    pub openai_api_key: Option<String>,
    pub vision_api_base: Option<String>,
    #[serde(default = "default_app_url")]
    pub app_url: String,

    pub elevenlabs_api_key: Option<String>,
    #[serde(default = "default_voice_id")]
    pub elevenlabs_voice_id: String,
    #[serde(default = "default_speech_api_base")]
    pub speech_api_base: String,

    pub otel_exporter_otlp_endpoint: Option<String>,
    #[serde(default = "default_service_name")]
    pub api_service_name: String,
    #[serde(default = "default_tracer_name")]
    pub api_tracer_name: String,
}

impl Env {
    pub fn new() -> EnvResult<Self> {
        if let Err(e) = dotenvy::dotenv()
            && !e.not_found()
        {
            return Err(e.into());
        }

        Ok(from_iter(std::env::vars())?)
    }

    /// Minimal config for tests: the required keys plus `vars`.
    #[cfg(test)]
    pub fn with_vars(vars: &[(&str, &str)]) -> Self {
        let required = [
            ("DATABASE_URL", "postgres://localhost/ecobin"),
            ("JWT_SECRET", "test-secret"),
        ];

        from_iter(
            required
                .iter()
                .chain(vars)
                .map(|(k, v)| (k.to_string(), v.to_string())),
        )
        .unwrap()
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_api_port() -> u16 {
    constants::DEFAULT_API_PORT
}

fn default_cors_origins() -> String {
    String::from("*")
}

fn default_upload_dir() -> String {
    String::from("uploads")
}

fn default_openrouter_model() -> String {
    String::from(constants::DEFAULT_OPENROUTER_MODEL)
}

fn default_app_url() -> String {
    String::from("http://localhost:8080")
}

fn default_voice_id() -> String {
    String::from(constants::DEFAULT_VOICE_ID)
}

fn default_speech_api_base() -> String {
    String::from(constants::ELEVENLABS_API_BASE)
}

fn default_service_name() -> String {
    String::from("ecobin-api")
}

fn default_tracer_name() -> String {
    String::from("ecobin-tracer")
}

pub fn from_iter<Iter, T>(iter: Iter) -> Result<T, EnvDeserializeError>
where
    T: de::DeserializeOwned,
    Iter: IntoIterator<Item = (String, String)>,
{
    let pairs = iter
        .into_iter()
        .map(|(name, value)| (name.clone(), EnvValue { name, value }));

    T::deserialize(MapDeserializer::<_, EnvDeserializeError>::new(pairs))
}

/// A single variable's raw string, plus its name for error reporting.
struct EnvValue {
    name: String,
    value: String,
}

impl<'de> IntoDeserializer<'de, EnvDeserializeError> for EnvValue {
    type Deserializer = Self;
    fn into_deserializer(self) -> Self::Deserializer {
        self
    }
}

macro_rules! parse_then_visit {
    ($($ty:ident => $method:ident,)*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value, EnvDeserializeError>
            where
                V: de::Visitor<'de>
            {
                match self.value.trim().parse::<$ty>() {
                    Ok(parsed) => parsed.into_deserializer().$method(visitor),
                    Err(e) => Err(de::Error::custom(format_args!(
                        "{}: while parsing '{}' ({})",
                        e, self.value, self.name
                    ))),
                }
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for EnvValue {
    type Error = EnvDeserializeError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.value.into_deserializer().deserialize_any(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        // an exported-but-empty variable counts as unset
        if self.value.is_empty() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        if self.value.is_empty() {
            return SeqDeserializer::new(empty::<EnvValue>()).deserialize_seq(visitor);
        }

        let name = self.name;
        let items = self
            .value
            .split(',')
            .map(|v| EnvValue {
                name: name.clone(),
                value: v.trim().to_owned(),
            })
            .collect::<Vec<_>>();

        SeqDeserializer::new(items.into_iter()).deserialize_seq(visitor)
    }

    fn deserialize_newtype_struct<V>(
        self,
        _: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _: &'static str,
        _: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_enum(self.value.into_deserializer())
    }

    parse_then_visit! {
        bool => deserialize_bool,
        u8 => deserialize_u8,
        u16 => deserialize_u16,
        u32 => deserialize_u32,
        u64 => deserialize_u64,
        i8 => deserialize_i8,
        i16 => deserialize_i16,
        i32 => deserialize_i32,
        i64 => deserialize_i64,
        f32 => deserialize_f32,
        f64 => deserialize_f64,
    }

    serde::forward_to_deserialize_any! {
        char str string unit bytes byte_buf map
        unit_struct tuple_struct identifier tuple
        ignored_any struct
    }
}

pub type EnvResult<T> = core::result::Result<T, EnvErr>;

#[derive(Debug, Error)]
pub enum EnvErr {
    #[error(transparent)]
    Dotenvy(#[from] dotenvy::Error),

    #[error(transparent)]
    DeserializationError(#[from] EnvDeserializeError),
}

#[derive(Debug, Error)]
pub enum EnvDeserializeError {
    #[error("env deserialization error: {0}")]
    Custom(String),

    #[error("missing environment variable: {0}")]
    MissingValue(String),
}

impl de::Error for EnvDeserializeError {
    fn custom<T>(msg: T) -> Self
    where
        T: std::fmt::Display,
    {
        EnvDeserializeError::Custom(msg.to_string())
    }

    fn missing_field(field: &'static str) -> Self {
        EnvDeserializeError::MissingValue(field.into())
    }
}
