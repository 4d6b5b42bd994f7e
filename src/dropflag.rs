//! This module is for testing only

use std::cell::RefCell;
use std::rc::Rc;

pub type DropFlag<T> = Rc<RefCell<T>>;

pub struct Droppable {
    pub dropflag: DropFlag<bool>,
}

impl Drop for Droppable {
    fn drop(&mut self) {
        *self.dropflag.borrow_mut() = true;
    }
}

/// Carries a value and bumps a shared counter every time an instance drops.
pub struct DropCounter {
    pub value: i32,
    pub drops: DropFlag<usize>,
}

impl DropCounter {
    pub fn new(value: i32, drops: &DropFlag<usize>) -> DropCounter {
        DropCounter {
            value,
            drops: drops.clone(),
        }
    }
}

impl Clone for DropCounter {
    fn clone(&self) -> DropCounter {
        DropCounter {
            value: self.value,
            drops: self.drops.clone(),
        }
    }
}

impl Drop for DropCounter {
    fn drop(&mut self) {
        *self.drops.borrow_mut() += 1;
    }
}

/// Clones successfully while the shared budget lasts, then panics. Drops are
/// counted like `DropCounter`, for originals and clones alike.
pub struct FlakyClone {
    pub value: i32,
    pub budget: DropFlag<i32>,
    pub drops: DropFlag<usize>,
}

impl FlakyClone {
    pub fn new(value: i32, budget: &DropFlag<i32>, drops: &DropFlag<usize>) -> FlakyClone {
        FlakyClone {
            value,
            budget: budget.clone(),
            drops: drops.clone(),
        }
    }
}

impl Clone for FlakyClone {
    fn clone(&self) -> FlakyClone {
        {
            let mut budget = self.budget.borrow_mut();
            if *budget == 0 {
                panic!("clone budget exhausted");
            }
            *budget -= 1;
        }
        FlakyClone {
            value: self.value,
            budget: self.budget.clone(),
            drops: self.drops.clone(),
        }
    }
}

impl Drop for FlakyClone {
    fn drop(&mut self) {
        *self.drops.borrow_mut() += 1;
    }
}

/// Counts drops like `DropCounter`, and panics from `Drop` while the shared
/// trigger is set. The trigger resets itself so later drops run normally.
pub struct PanicOnDrop {
    pub value: i32,
    pub armed: DropFlag<bool>,
    pub drops: DropFlag<usize>,
}

impl PanicOnDrop {
    pub fn new(value: i32, armed: &DropFlag<bool>, drops: &DropFlag<usize>) -> PanicOnDrop {
        PanicOnDrop {
            value,
            armed: armed.clone(),
            drops: drops.clone(),
        }
    }
}

impl Clone for PanicOnDrop {
    fn clone(&self) -> PanicOnDrop {
        PanicOnDrop {
            value: self.value,
            armed: self.armed.clone(),
            drops: self.drops.clone(),
        }
    }
}

impl Drop for PanicOnDrop {
    fn drop(&mut self) {
        *self.drops.borrow_mut() += 1;
        let mut armed = self.armed.borrow_mut();
        if *armed {
            *armed = false;
            drop(armed);
            panic!("drop failure");
        }
    }
}

#[test]
fn dropflag() {
    let flag = DropFlag::new(RefCell::new(false));
    let droppable = Droppable { dropflag: flag.clone() };
    assert_eq!(false, *flag.borrow());
    std::mem::drop(droppable);
    assert_eq!(true, *flag.borrow());
}

#[test]
fn drop_counter_counts_every_drop() {
    let drops = DropFlag::new(RefCell::new(0usize));
    let a = DropCounter::new(1, &drops);
    let b = a.clone();
    std::mem::drop(a);
    assert_eq!(1, *drops.borrow());
    std::mem::drop(b);
    assert_eq!(2, *drops.borrow());
}
