use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{Result, StorageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SlotBucket {
    pub capacity: u32,
    pub remaining: u32,
}

/// The slot pool of an event, decided once at creation time.
///
/// Most events hand out slots from a single scalar pool. A few hand them
/// out per named bucket (sex buckets for the pageant event, weight buckets
/// for the combat event). Operations dispatch on the variant; bucket names
/// are plain data and never special-cased by event name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum SlotPool {
    Scalar { slots: SlotBucket },
    Categorical { buckets: BTreeMap<String, SlotBucket> },
}

impl SlotPool {
    pub fn scalar(capacity: u32) -> Self {
        SlotPool::Scalar {
            slots: SlotBucket {
                capacity,
                remaining: capacity,
            },
        }
    }

    pub fn categorical(buckets: impl IntoIterator<Item = (String, u32)>) -> Self {
        SlotPool::Categorical {
            buckets: buckets
                .into_iter()
                .map(|(name, capacity)| {
                    (
                        name,
                        SlotBucket {
                            capacity,
                            remaining: capacity,
                        },
                    )
                })
                .collect(),
        }
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self, SlotPool::Categorical { .. })
    }

    pub fn bucket_names(&self) -> Vec<Option<String>> {
        match self {
            SlotPool::Scalar { .. } => vec![None],
            SlotPool::Categorical { buckets } => {
                buckets.keys().map(|k| Some(k.clone())).collect()
            }
        }
    }

    /// Resolve a caller-supplied discriminator against the pool shape.
    /// Scalar pools take no discriminator; categorical pools require one
    /// naming a declared bucket.
    fn bucket_mut(&mut self, bucket: Option<&str>) -> Result<&mut SlotBucket> {
        match (self, bucket) {
            (SlotPool::Scalar { slots }, None) => Ok(slots),
            (SlotPool::Scalar { .. }, Some(name)) => Err(StorageError::invalid(format!(
                "event has no category buckets, got '{name}'"
            ))),
            (SlotPool::Categorical { .. }, None) => {
                Err(StorageError::invalid("category bucket required"))
            }
            (SlotPool::Categorical { buckets }, Some(name)) => buckets
                .get_mut(name)
                .ok_or_else(|| StorageError::invalid(format!("unknown bucket '{name}'"))),
        }
    }

    pub fn bucket(&self, bucket: Option<&str>) -> Result<&SlotBucket> {
        match (self, bucket) {
            (SlotPool::Scalar { slots }, None) => Ok(slots),
            (SlotPool::Scalar { .. }, Some(name)) => Err(StorageError::invalid(format!(
                "event has no category buckets, got '{name}'"
            ))),
            (SlotPool::Categorical { .. }, None) => {
                Err(StorageError::invalid("category bucket required"))
            }
            (SlotPool::Categorical { buckets }, Some(name)) => buckets
                .get(name)
                .ok_or_else(|| StorageError::invalid(format!("unknown bucket '{name}'"))),
        }
    }

    pub fn remaining(&self, bucket: Option<&str>) -> Result<u32> {
        Ok(self.bucket(bucket)?.remaining)
    }

    /// Take one slot. Fails with `NoCapacity` when the bucket is exhausted,
    /// leaving the pool untouched.
    pub fn take(&mut self, bucket: Option<&str>) -> Result<()> {
        let b = self.bucket_mut(bucket)?;
        if b.remaining == 0 {
            return Err(StorageError::NoCapacity);
        }
        b.remaining -= 1;
        Ok(())
    }

    /// Return one slot to the pool.
    pub fn refund(&mut self, bucket: Option<&str>) -> Result<()> {
        let b = self.bucket_mut(bucket)?;
        b.remaining += 1;
        Ok(())
    }

    /// Manufacture one extra free slot. Used only by the replacement
    /// workflow, which deflates again once the departing entrant's slot has
    /// been refunded.
    pub fn inflate(&mut self, bucket: Option<&str>) -> Result<()> {
        self.refund(bucket)
    }

    /// Remove one free slot, undoing a prior inflation.
    pub fn deflate(&mut self, bucket: Option<&str>) -> Result<()> {
        let b = self.bucket_mut(bucket)?;
        if b.remaining == 0 {
            return Err(StorageError::NoCapacity);
        }
        b.remaining -= 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_take_and_refund() {
        let mut pool = SlotPool::scalar(2);
        pool.take(None).unwrap();
        pool.take(None).unwrap();
        assert!(matches!(pool.take(None), Err(StorageError::NoCapacity)));
        assert_eq!(pool.remaining(None).unwrap(), 0);

        pool.refund(None).unwrap();
        assert_eq!(pool.remaining(None).unwrap(), 1);
    }

    #[test]
    fn scalar_rejects_stray_discriminator() {
        let mut pool = SlotPool::scalar(1);
        assert!(matches!(
            pool.take(Some("male")),
            Err(StorageError::InvalidArgument(_))
        ));
        assert_eq!(pool.remaining(None).unwrap(), 1);
    }

    #[test]
    fn categorical_buckets_are_independent() {
        let mut pool =
            SlotPool::categorical([("male".to_string(), 1), ("female".to_string(), 1)]);
        pool.take(Some("male")).unwrap();
        assert!(matches!(
            pool.take(Some("male")),
            Err(StorageError::NoCapacity)
        ));
        pool.take(Some("female")).unwrap();
        assert_eq!(pool.remaining(Some("female")).unwrap(), 0);
    }

    #[test]
    fn categorical_requires_known_bucket() {
        let mut pool = SlotPool::categorical([("light_weight".to_string(), 3)]);
        assert!(matches!(
            pool.take(None),
            Err(StorageError::InvalidArgument(_))
        ));
        assert!(matches!(
            pool.take(Some("feather_weight")),
            Err(StorageError::InvalidArgument(_))
        ));
    }

    #[test]
    fn inflate_then_deflate_restores_remaining() {
        let mut pool = SlotPool::scalar(3);
        pool.take(None).unwrap();
        pool.inflate(None).unwrap();
        assert_eq!(pool.remaining(None).unwrap(), 3);
        pool.deflate(None).unwrap();
        assert_eq!(pool.remaining(None).unwrap(), 2);
    }
}
