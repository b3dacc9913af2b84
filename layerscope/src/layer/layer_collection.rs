use std::ops::{Index, IndexMut};

use crate::layer::Layer;

/// Ordered list of the application's layers.
///
/// Layers are drawn in the order they are stored in the collection. Any layer can be temporarily
/// hidden with [`LayerCollection::hide`] or [`LayerCollection::show_by`]. Hidden layers keep their
/// place in the collection.
///
/// The engine never removes layers on its own: layers leave the collection only through the
/// removal methods below.
///
/// ```
/// use layerscope::layer::{Layer, LayerCollection};
///
/// let mut collection = LayerCollection::default();
/// collection.push(Layer::empty("Roads"));
/// collection.push(Layer::empty("Schools"));
///
/// assert_eq!(collection[1].name(), "Schools");
/// ```
#[derive(Debug, Default, Clone)]
pub struct LayerCollection(Vec<Layer>);

impl LayerCollection {
    /// Adds the layer to the end of the collection.
    pub fn push(&mut self, layer: Layer) {
        self.0.push(layer)
    }

    /// Inserts a layer at position `index`, shifting all layers after it to the right.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`
    ///
    /// # Examples
    ///
    /// ```
    /// use layerscope::layer::{Layer, LayerCollection};
    ///
    /// let mut collection = LayerCollection::from(vec![
    ///     Layer::empty("Layer A"),
    ///     Layer::empty("Layer B"),
    /// ]);
    ///
    /// collection.insert(1, Layer::empty("Layer C"));
    /// assert_eq!(collection.len(), 3);
    /// assert_eq!(collection[1].name(), "Layer C");
    /// assert_eq!(collection[2].name(), "Layer B");
    /// ```
    pub fn insert(&mut self, index: usize, layer: Layer) {
        self.0.insert(index, layer);
    }

    /// Removes a layer at `index`, shifting all layers after it to the left and returning the
    /// removed layer.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn remove(&mut self, index: usize) -> Layer {
        self.0.remove(index)
    }

    /// Removes the first layer with the given name and returns it.
    pub fn remove_by_name(&mut self, name: &str) -> Option<Layer> {
        let index = self.position(name)?;
        Some(self.0.remove(index))
    }

    /// Retains only the layers specified by the predicate.
    ///
    /// # Examples
    ///
    /// ```
    /// use layerscope::layer::{Layer, LayerCollection};
    ///
    /// let mut collection = LayerCollection::from(vec![
    ///     Layer::empty("Layer A"),
    ///     Layer::empty("Layer B"),
    ///     Layer::empty("Layer C"),
    /// ]);
    ///
    /// collection.retain(|layer| !layer.name().ends_with('A'));
    ///
    /// assert_eq!(collection.len(), 2);
    /// assert_eq!(collection[0].name(), "Layer B");
    /// ```
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&Layer) -> bool,
    {
        self.0.retain(f)
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no layers.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Layer at `index`.
    pub fn get(&self, index: usize) -> Option<&Layer> {
        self.0.get(index)
    }

    /// Mutable layer at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.0.get_mut(index)
    }

    /// Index of the first layer with the given name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|layer| layer.name() == name)
    }

    /// First layer with the given name.
    pub fn by_name(&self, name: &str) -> Option<&Layer> {
        self.0.iter().find(|layer| layer.name() == name)
    }

    /// Swaps the layers at indices `a` and `b`.
    ///
    /// # Panics
    ///
    /// Panics if `a` or `b` are out of bounds.
    pub fn swap(&mut self, a: usize, b: usize) {
        self.0.swap(a, b)
    }

    /// Iterates over all layers, including hidden ones.
    pub fn iter(&self) -> impl Iterator<Item = &Layer> + '_ {
        self.0.iter()
    }

    /// Iterates mutably over all layers, including hidden ones.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Layer> + '_ {
        self.0.iter_mut()
    }

    /// Iterates over the layers that are drawn.
    pub fn iter_visible(&self) -> impl Iterator<Item = &Layer> + '_ {
        self.0.iter().filter(|layer| layer.style().visible)
    }

    /// Hides the layer at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn hide(&mut self, index: usize) {
        self.0[index].style_mut().visible = false;
    }

    /// Shows the layer at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn show(&mut self, index: usize) {
        self.0[index].style_mut().visible = true;
    }

    /// Shows the layers for which the predicate returns true and hides all others.
    ///
    /// # Examples
    ///
    /// ```
    /// use layerscope::layer::{Layer, LayerCollection};
    ///
    /// let mut collection = LayerCollection::from(vec![
    ///     Layer::empty("Layer A"),
    ///     Layer::empty("Layer B"),
    /// ]);
    ///
    /// collection.show_by(|layer| layer.name() == "Layer B");
    /// let visible: Vec<_> = collection.iter_visible().map(|layer| layer.name()).collect();
    /// assert_eq!(visible, vec!["Layer B"]);
    /// ```
    pub fn show_by<F>(&mut self, mut f: F)
    where
        F: FnMut(&Layer) -> bool,
    {
        for layer in &mut self.0 {
            let visible = f(layer);
            layer.style_mut().visible = visible;
        }
    }
}

impl From<Vec<Layer>> for LayerCollection {
    fn from(value: Vec<Layer>) -> Self {
        Self(value)
    }
}

impl Index<usize> for LayerCollection {
    type Output = Layer;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IndexMut<usize> for LayerCollection {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_layers_keep_their_place() {
        let mut collection = LayerCollection::from(vec![
            Layer::empty("A"),
            Layer::empty("B"),
            Layer::empty("C"),
        ]);

        collection.hide(1);
        assert_eq!(collection.len(), 3);
        assert_eq!(
            collection.iter_visible().map(Layer::name).collect::<Vec<_>>(),
            vec!["A", "C"]
        );

        collection.show(1);
        assert_eq!(collection.iter_visible().count(), 3);
    }

    #[test]
    fn lookup_by_name() {
        let mut collection = LayerCollection::from(vec![Layer::empty("A"), Layer::empty("B")]);

        assert_eq!(collection.position("B"), Some(1));
        assert!(collection.by_name("C").is_none());

        let removed = collection.remove_by_name("A").expect("layer exists");
        assert_eq!(removed.name(), "A");
        assert_eq!(collection[0].name(), "B");
        assert!(collection.remove_by_name("A").is_none());
    }

    #[test]
    fn swap_and_remove() {
        let mut collection = LayerCollection::from(vec![Layer::empty("A"), Layer::empty("B")]);
        collection.swap(0, 1);
        assert_eq!(collection[0].name(), "B");

        let removed = collection.remove(0);
        assert_eq!(removed.name(), "B");
        assert_eq!(collection.len(), 1);
        assert!(!collection.is_empty());
    }
}
