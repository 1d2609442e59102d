//! Await a whole collection of outcomes at once.
//!
//! [`AsyncResult::all`] accepts any [`Sequence`]: ordered collections
//! (`Vec`, arrays, tuples), keyed collections (`BTreeMap`, `HashMap`) and the
//! dynamically shaped [`Members`]. Every member is resolved with the same
//! deep-unwrapping rule as [`AsyncResult::resolve`], and all members make
//! progress concurrently. The result has the same shape as the input.

use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::fmt;
use std::hash::{BuildHasher, Hash};

use futures_concurrency::future::TryJoin;

use super::{AsyncResult, Resolvable};

/// A collection of [`Resolvable`] members that can be awaited as one.
pub trait Sequence {
    /// The collection of unwrapped payloads.
    type Output;
    /// The error of the first failing member.
    type Error;

    /// Join every member into one future.
    fn sequence(self) -> AsyncResult<Self::Output, Self::Error>;
}

impl<V: 'static, E: 'static> AsyncResult<V, E> {
    /// Wait for every member of `members`.
    ///
    /// Settles with a collection of the same shape holding each member's
    /// unwrapped payload, or with the first failure. Only one level is
    /// joined: a member whose payload is itself a collection is returned
    /// as-is. Closures are payloads like any other value and are never
    /// called.
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use async_result::future::AsyncResult;
    /// use async_result::runtime::block_on;
    ///
    /// let members = BTreeMap::from([
    ///     ("a", AsyncResult::<_, ()>::ok(1)),
    ///     ("b", AsyncResult::ok(2).then(|x| Ok(x * 10))),
    /// ]);
    /// let out = block_on(AsyncResult::all(members)).unwrap();
    /// assert_eq!(out, BTreeMap::from([("a", 1), ("b", 20)]));
    /// ```
    pub fn all<S>(members: S) -> Self
    where
        S: Sequence<Output = V, Error = E>,
    {
        members.sequence()
    }
}

impl<M> Sequence for Vec<M>
where
    M: Resolvable,
    M::Value: 'static,
    M::Error: 'static,
{
    type Output = Vec<M::Value>;
    type Error = M::Error;

    fn sequence(self) -> AsyncResult<Self::Output, Self::Error> {
        let members: Vec<_> = self.into_iter().map(AsyncResult::resolve).collect();
        AsyncResult::from_future(members.try_join())
    }
}

impl<M, const N: usize> Sequence for [M; N]
where
    M: Resolvable,
    M::Value: 'static,
    M::Error: 'static,
{
    type Output = [M::Value; N];
    type Error = M::Error;

    fn sequence(self) -> AsyncResult<Self::Output, Self::Error> {
        AsyncResult::from_future(self.map(AsyncResult::resolve).try_join())
    }
}

impl<K, M> Sequence for BTreeMap<K, M>
where
    K: Ord + 'static,
    M: Resolvable,
    M::Value: 'static,
    M::Error: 'static,
{
    type Output = BTreeMap<K, M::Value>;
    type Error = M::Error;

    fn sequence(self) -> AsyncResult<Self::Output, Self::Error> {
        let (keys, members): (Vec<K>, Vec<_>) = self
            .into_iter()
            .map(|(key, member)| (key, AsyncResult::resolve(member)))
            .unzip();
        AsyncResult::from_future(members.try_join())
            .then(move |values| Ok(keys.into_iter().zip(values).collect()))
    }
}

impl<K, M, S> Sequence for HashMap<K, M, S>
where
    K: Eq + Hash + 'static,
    M: Resolvable,
    M::Value: 'static,
    M::Error: 'static,
    S: BuildHasher + Default + 'static,
{
    type Output = HashMap<K, M::Value, S>;
    type Error = M::Error;

    fn sequence(self) -> AsyncResult<Self::Output, Self::Error> {
        let (keys, members): (Vec<K>, Vec<_>) = self
            .into_iter()
            .map(|(key, member)| (key, AsyncResult::resolve(member)))
            .unzip();
        AsyncResult::from_future(members.try_join())
            .then(move |values| Ok(keys.into_iter().zip(values).collect()))
    }
}

macro_rules! impl_sequence_for_tuple {
    ($($M:ident)+) => {
        impl<Fail, $($M,)+> Sequence for ($($M,)+)
        where
            Fail: 'static,
            $(
                $M: Resolvable<Error = Fail>,
                <$M as Resolvable>::Value: 'static,
            )+
        {
            type Output = ($(<$M as Resolvable>::Value,)+);
            type Error = Fail;

            #[allow(non_snake_case)]
            fn sequence(self) -> AsyncResult<Self::Output, Self::Error> {
                let ($($M,)+) = self;
                AsyncResult::from_future(($(AsyncResult::resolve($M),)+).try_join())
            }
        }
    };
}

impl_sequence_for_tuple! { A B }
impl_sequence_for_tuple! { A B C }
impl_sequence_for_tuple! { A B C D }
impl_sequence_for_tuple! { A B C D E }
impl_sequence_for_tuple! { A B C D E F }
impl_sequence_for_tuple! { A B C D E F G }
impl_sequence_for_tuple! { A B C D E F G H }

/// Members whose shape is only known at runtime.
///
/// Anything that is neither ordered nor keyed is represented by
/// `Other(kind)`, and sequencing it fails with
/// [`AllError::NotACollection`].
#[derive(Debug)]
pub enum Members<M> {
    /// An ordered collection.
    Seq(Vec<M>),
    /// A keyed collection.
    Map(BTreeMap<String, M>),
    /// Not a collection; `kind` names what was found instead.
    Other(&'static str),
}

impl<M> From<Vec<M>> for Members<M> {
    fn from(members: Vec<M>) -> Self {
        Members::Seq(members)
    }
}

impl<M> From<BTreeMap<String, M>> for Members<M> {
    fn from(members: BTreeMap<String, M>) -> Self {
        Members::Map(members)
    }
}

/// The joined payloads of [`Members`], in the same shape.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize), serde(untagged))]
pub enum Collection<V> {
    /// Payloads of [`Members::Seq`], in order.
    Seq(Vec<V>),
    /// Payloads of [`Members::Map`], under their keys.
    Map(BTreeMap<String, V>),
}

impl<V> Collection<V> {
    /// Returns the ordered payloads, if this came from [`Members::Seq`].
    pub fn into_seq(self) -> Option<Vec<V>> {
        match self {
            Collection::Seq(values) => Some(values),
            Collection::Map(_) => None,
        }
    }

    /// Returns the keyed payloads, if this came from [`Members::Map`].
    pub fn into_map(self) -> Option<BTreeMap<String, V>> {
        match self {
            Collection::Map(values) => Some(values),
            Collection::Seq(_) => None,
        }
    }
}

/// The error of sequencing [`Members`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllError<E> {
    /// The input was not a collection.
    NotACollection {
        /// What was found instead.
        found: &'static str,
    },
    /// A member failed with this error.
    Member(E),
}

impl<E> AllError<E> {
    /// Returns the member's error, if a member failed.
    pub fn into_member(self) -> Option<E> {
        match self {
            AllError::Member(error) => Some(error),
            AllError::NotACollection { .. } => None,
        }
    }
}

impl<E: fmt::Display> fmt::Display for AllError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllError::NotACollection { found } => {
                write!(f, "expected a sequence or a mapping, found {found}")
            }
            AllError::Member(error) => fmt::Display::fmt(error, f),
        }
    }
}

impl<E: Error + 'static> Error for AllError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AllError::NotACollection { .. } => None,
            AllError::Member(error) => error.source(),
        }
    }
}

impl<M> Sequence for Members<M>
where
    M: Resolvable,
    M::Value: 'static,
    M::Error: 'static,
{
    type Output = Collection<M::Value>;
    type Error = AllError<M::Error>;

    fn sequence(self) -> AsyncResult<Self::Output, Self::Error> {
        match self {
            Members::Seq(members) => members.sequence().then_else(
                |values| Ok(Collection::Seq(values)),
                |error| Err(AllError::Member(error)),
            ),
            Members::Map(members) => members.sequence().then_else(
                |values| Ok(Collection::Map(values)),
                |error| Err(AllError::Member(error)),
            ),
            Members::Other(found) => {
                tracing::debug!(found, "refusing to sequence a non-collection");
                AsyncResult::reject(AllError::NotACollection { found })
            }
        }
    }
}

#[cfg(feature = "json")]
mod json {
    use serde_json::Value;

    use super::{Collection, Members};
    use crate::future::Resolution;

    /// Arrays and objects become collections of settled members; every
    /// other JSON value is [`Members::Other`].
    impl<E> From<Value> for Members<Resolution<Value, E>> {
        fn from(value: Value) -> Self {
            match value {
                Value::Array(items) => Members::Seq(items.into_iter().map(Resolution::Value).collect()),
                Value::Object(entries) => Members::Map(
                    entries
                        .into_iter()
                        .map(|(key, value)| (key, Resolution::Value(value)))
                        .collect(),
                ),
                Value::Null => Members::Other("null"),
                Value::Bool(_) => Members::Other("boolean"),
                Value::Number(_) => Members::Other("number"),
                Value::String(_) => Members::Other("string"),
            }
        }
    }

    impl From<Collection<Value>> for Value {
        fn from(collection: Collection<Value>) -> Self {
            match collection {
                Collection::Seq(values) => Value::Array(values),
                Collection::Map(values) => Value::Object(values.into_iter().collect()),
            }
        }
    }
}
