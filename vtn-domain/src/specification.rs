//! 规约（Specification）
//!
//! 把筛选条件封装为可复用、可组合的对象，供查询引擎与列表过滤使用。
//!

/// 规约模式的核心 trait
pub trait Specification<T> {
    /// 检查候选对象是否满足规约
    fn is_satisfied_by(&self, candidate: &T) -> bool;

    /// 与另一个规约进行 AND 组合
    fn and<S>(self, other: S) -> And<Self, S>
    where
        Self: Sized,
        S: Specification<T>,
    {
        And(self, other)
    }

    /// 与另一个规约进行 OR 组合
    fn or<S>(self, other: S) -> Or<Self, S>
    where
        Self: Sized,
        S: Specification<T>,
    {
        Or(self, other)
    }

    /// 对规约取反
    fn not(self) -> Not<Self>
    where
        Self: Sized,
    {
        Not(self)
    }
}

impl<T, S: Specification<T> + ?Sized> Specification<T> for &S {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        (**self).is_satisfied_by(candidate)
    }
}

impl<T, S: Specification<T> + ?Sized> Specification<T> for Box<S> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        self.as_ref().is_satisfied_by(candidate)
    }
}

pub type BoxSpecification<T> = Box<dyn Specification<T> + Send + Sync>;

pub struct And<A, B>(A, B);

impl<T, A: Specification<T>, B: Specification<T>> Specification<T> for And<A, B> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        self.0.is_satisfied_by(candidate) && self.1.is_satisfied_by(candidate)
    }
}

pub struct Or<A, B>(A, B);

impl<T, A: Specification<T>, B: Specification<T>> Specification<T> for Or<A, B> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        self.0.is_satisfied_by(candidate) || self.1.is_satisfied_by(candidate)
    }
}

pub struct Not<A>(A);

impl<T, A: Specification<T>> Specification<T> for Not<A> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        !self.0.is_satisfied_by(candidate)
    }
}

/// 恒为真的规约
#[derive(Debug, Clone, Copy, Default)]
pub struct Everything;

impl<T> Specification<T> for Everything {
    fn is_satisfied_by(&self, _candidate: &T) -> bool {
        true
    }
}

/// 以闭包表达的规约
pub struct Predicate<F>(F);

/// 用闭包构造规约：`predicate(|p: &Program| p.local_price)`
pub fn predicate<T, F>(f: F) -> Predicate<F>
where
    F: Fn(&T) -> bool,
{
    Predicate(f)
}

impl<T, F: Fn(&T) -> bool> Specification<T> for Predicate<F> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        (self.0)(candidate)
    }
}

/// 多个规约全部满足（空列表视为满足）
pub struct AllOf<T>(Vec<BoxSpecification<T>>);

impl<T> AllOf<T> {
    pub fn new(specs: Vec<BoxSpecification<T>>) -> Self {
        Self(specs)
    }

    pub fn push(&mut self, spec: BoxSpecification<T>) {
        self.0.push(spec);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> Default for AllOf<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> Specification<T> for AllOf<T> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        self.0.iter().all(|s| s.is_satisfied_by(candidate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Even;
    impl Specification<i32> for Even {
        fn is_satisfied_by(&self, c: &i32) -> bool {
            c % 2 == 0
        }
    }

    struct Positive;
    impl Specification<i32> for Positive {
        fn is_satisfied_by(&self, c: &i32) -> bool {
            *c > 0
        }
    }

    #[test]
    fn combinators() {
        assert!(Even.and(Positive).is_satisfied_by(&4));
        assert!(!Even.and(Positive).is_satisfied_by(&-4));
        assert!(Even.or(Positive).is_satisfied_by(&3));
        assert!(!Even.or(Positive).is_satisfied_by(&-3));
        assert!(Even.not().is_satisfied_by(&3));
    }

    #[test]
    fn closures_and_boxes() {
        let small = predicate(|c: &i32| *c < 10);
        assert!(small.is_satisfied_by(&2));

        let boxed: BoxSpecification<i32> = Box::new(Even);
        assert!(boxed.is_satisfied_by(&8));

        // (Even AND small) OR NOT Positive
        let spec = Even.and(small).or(Positive.not());
        assert!(spec.is_satisfied_by(&-7));
        assert!(!spec.is_satisfied_by(&12));
    }

    #[test]
    fn all_of_is_conjunction() {
        let mut all = AllOf::default();
        assert!(all.is_satisfied_by(&-1));
        all.push(Box::new(Even));
        all.push(Box::new(Positive));
        assert!(all.is_satisfied_by(&6));
        assert!(!all.is_satisfied_by(&5));
        assert!(Everything.is_satisfied_by(&0));
    }
}
