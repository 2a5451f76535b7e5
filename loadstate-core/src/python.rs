//! Python Bindings
//!
//! Exposes the payload type and the summary projection to Python. Built only
//! with the `python` feature.

use pyo3::prelude::*;

use crate::poem::{self, Poem};

/// Python-exposed Poem type.
#[pyclass(name = "Poem")]
#[derive(Clone)]
pub struct PyPoem {
    inner: Poem,
}

#[pymethods]
impl PyPoem {
    #[new]
    fn new(title: String, verses: Vec<String>) -> Self {
        Self {
            inner: Poem { title, verses },
        }
    }

    #[getter]
    fn title(&self) -> String {
        self.inner.title.clone()
    }

    #[getter]
    fn verses(&self) -> Vec<String> {
        self.inner.verses.clone()
    }

    /// Summary string for this poem.
    fn summary(&self) -> Option<String> {
        poem::summarize(Some(&self.inner))
    }

    fn __repr__(&self) -> String {
        format!(
            "Poem(title={:?}, verses={})",
            self.inner.title,
            self.inner.verses.len()
        )
    }
}

/// Summarize an optional poem. `None` maps to `None`.
#[pyfunction]
#[pyo3(signature = (poem=None))]
fn summarize(poem: Option<PyRef<'_, PyPoem>>) -> Option<String> {
    poem::summarize(poem.as_ref().map(|p| &p.inner))
}

/// Python module definition.
///
/// This function is called by Python when importing the module.
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyPoem>()?;
    m.add_function(wrap_pyfunction!(summarize, m)?)?;
    m.add("MISSING_VERSE", poem::MISSING_VERSE)?;

    // Add version info
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
