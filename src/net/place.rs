/// Index into [`super::cpn::Net`]'s place table. Stable for the lifetime of
/// the net: places are never removed once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaceId(pub(crate) usize);

#[derive(Debug, Clone)]
pub struct Place {
    pub name: String,
    pub tokens: u32,
}
