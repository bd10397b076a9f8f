//! Fake data generators backed by the `fake` crate.

use std::fmt;
use std::str::FromStr;

use fake::Fake;
use fake::faker::boolean::en::Boolean;
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::{SafeEmail, Username};
use fake::faker::lorem::en::{Paragraph, Sentence, Word};
use fake::faker::name::en::{FirstName, LastName, Name};
use serde_json::Value;

use crate::error::BuildError;

/// Kinds of fake data a blueprint attribute can draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakerType {
	/// Full person name.
	Name,
	/// Given name.
	FirstName,
	/// Family name.
	LastName,
	/// Login name.
	Username,
	/// Email address on a reserved domain.
	Email,
	/// Single lorem word.
	Word,
	/// Lorem sentence of four to nine words.
	Sentence,
	/// Lorem paragraph of two to five sentences.
	Paragraph,
	/// Company name.
	CompanyName,
	/// Integer in an inclusive range.
	Integer {
		/// Lower bound.
		min: i64,
		/// Upper bound.
		max: i64,
	},
	/// Boolean, true half of the time.
	Boolean,
	/// Random v4 UUID string.
	Uuid,
}

/// Generates one fake value.
///
/// # Example
///
/// ```
/// use fabrik_core::blueprint::{FakerType, generate_fake};
///
/// let email = generate_fake(FakerType::Email);
/// assert!(email.as_str().unwrap().contains('@'));
/// ```
pub fn generate_fake(faker: FakerType) -> Value {
	match faker {
		FakerType::Name => Value::String(Name().fake()),
		FakerType::FirstName => Value::String(FirstName().fake()),
		FakerType::LastName => Value::String(LastName().fake()),
		FakerType::Username => Value::String(Username().fake()),
		FakerType::Email => Value::String(SafeEmail().fake()),
		FakerType::Word => Value::String(Word().fake()),
		FakerType::Sentence => Value::String(Sentence(4..10).fake()),
		FakerType::Paragraph => Value::String(Paragraph(2..6).fake()),
		FakerType::CompanyName => Value::String(CompanyName().fake()),
		FakerType::Integer { min, max } => {
			let (low, high) = if min <= max { (min, max) } else { (max, min) };
			Value::from((low..=high).fake::<i64>())
		}
		FakerType::Boolean => Value::Bool(Boolean(50).fake()),
		FakerType::Uuid => Value::String(uuid::Uuid::new_v4().to_string()),
	}
}

impl FromStr for FakerType {
	type Err = BuildError;

	fn from_str(name: &str) -> Result<Self, Self::Err> {
		match name {
			"name" => Ok(Self::Name),
			"first_name" => Ok(Self::FirstName),
			"last_name" => Ok(Self::LastName),
			"username" => Ok(Self::Username),
			"email" => Ok(Self::Email),
			"word" => Ok(Self::Word),
			"sentence" => Ok(Self::Sentence),
			"paragraph" => Ok(Self::Paragraph),
			"company_name" => Ok(Self::CompanyName),
			"boolean" => Ok(Self::Boolean),
			"uuid" => Ok(Self::Uuid),
			other => Err(BuildError::Generator(format!("Unknown faker type: {other}"))),
		}
	}
}

impl fmt::Display for FakerType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Name => f.write_str("name"),
			Self::FirstName => f.write_str("first_name"),
			Self::LastName => f.write_str("last_name"),
			Self::Username => f.write_str("username"),
			Self::Email => f.write_str("email"),
			Self::Word => f.write_str("word"),
			Self::Sentence => f.write_str("sentence"),
			Self::Paragraph => f.write_str("paragraph"),
			Self::CompanyName => f.write_str("company_name"),
			Self::Integer { min, max } => write!(f, "integer({min}..={max})"),
			Self::Boolean => f.write_str("boolean"),
			Self::Uuid => f.write_str("uuid"),
		}
	}
}
