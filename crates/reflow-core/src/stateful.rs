//! Class-like calling convention.
//!
//! Lifecycle-method components and hook components are the same
//! instance-state-and-effect model underneath; [`StateHolder`] is the
//! structured surface, implemented entirely on `use_reducer` + `use_effect`.

use crate::effects::{Cleanup, use_mount};
use crate::hooks::{Dispatch, use_reducer};
use crate::view::{VNode, component};

pub trait StateHolder: 'static {
    type Props: Clone + 'static;
    type State: Clone + 'static;
    type Event: 'static;

    const NAME: &'static str;

    fn initial(props: &Self::Props) -> Self::State;
    fn reduce(state: &Self::State, event: Self::Event) -> Self::State;
    fn render(props: &Self::Props, state: &Self::State, dispatch: &Dispatch<Self::Event>) -> VNode;

    /// Runs once after the first commit.
    fn did_mount(_props: &Self::Props, _dispatch: &Dispatch<Self::Event>) {}
    /// Runs when the instance leaves the tree.
    fn will_unmount() {}
}

/// Mounts a [`StateHolder`] as a component node.
pub fn stateful<C: StateHolder>(props: C::Props) -> VNode {
    component(C::NAME, props, |props: &C::Props| {
        let (state, dispatch) = use_reducer(C::reduce, || C::initial(props));
        {
            let props = props.clone();
            let dispatch = dispatch.clone();
            use_mount(move || {
                C::did_mount(&props, &dispatch);
                Cleanup::new(C::will_unmount)
            });
        }
        C::render(props, &state, &dispatch)
    })
}
