// Object list editing. Every function takes the current snapshot and returns
// the next one; the caller decides whether to commit it.

use egui::{Pos2, Vec2};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{CanvasObject, ObjectId};

/// Z-order moves. Later objects in the list are drawn on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZOrder {
    ToFront,
    ToBack,
    Forward,
    Backward,
}

pub fn position_of(objects: &[CanvasObject], id: ObjectId) -> Option<usize> {
    objects.iter().position(|o| o.id() == id)
}

pub fn with_added(objects: &[CanvasObject], object: CanvasObject) -> Vec<CanvasObject> {
    let mut next = objects.to_vec();
    next.push(object);
    next
}

pub fn without(objects: &[CanvasObject], id: ObjectId) -> Vec<CanvasObject> {
    objects.iter().filter(|o| o.id() != id).cloned().collect()
}

/// Swap in `object` for the entry sharing its id, keeping its z position.
pub fn with_replaced(objects: &[CanvasObject], object: CanvasObject) -> Vec<CanvasObject> {
    let id = object.id();
    let mut next = objects.to_vec();
    match position_of(&next, id) {
        Some(index) => next[index] = object,
        None => trace!(%id, "replace skipped, object not found"),
    }
    next
}

pub fn with_translated(objects: &[CanvasObject], id: ObjectId, delta: Vec2) -> Vec<CanvasObject> {
    objects
        .iter()
        .map(|o| {
            if o.id() == id {
                o.translated(delta)
            } else {
                o.clone()
            }
        })
        .collect()
}

pub fn arranged(objects: &[CanvasObject], id: ObjectId, order: ZOrder) -> Vec<CanvasObject> {
    let mut next = objects.to_vec();
    let Some(index) = position_of(&next, id) else {
        trace!(%id, ?order, "arrange skipped, object not found");
        return next;
    };

    let last = next.len() - 1;
    match order {
        ZOrder::ToFront => {
            let obj = next.remove(index);
            next.push(obj);
        }
        ZOrder::ToBack => {
            let obj = next.remove(index);
            next.insert(0, obj);
        }
        ZOrder::Forward => {
            if index < last {
                next.swap(index, index + 1);
            }
        }
        ZOrder::Backward => {
            if index > 0 {
                next.swap(index, index - 1);
            }
        }
    }
    next
}

/// Top-most object under `point`.
pub fn hit_test(objects: &[CanvasObject], point: Pos2) -> Option<&CanvasObject> {
    objects.iter().rev().find(|o| o.bounds().contains(point))
}
