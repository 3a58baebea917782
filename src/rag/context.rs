//! Product context assembled from k-NN hits

use crate::models::ProductMatch;

/// The top product and its runner-up, when the index returned them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductContext {
    pub top: Option<ProductMatch>,
    pub next: Option<ProductMatch>,
}

impl ProductContext {
    /// Keep the two best hits; missing hits are simply absent
    #[must_use]
    pub fn from_matches(matches: Vec<ProductMatch>) -> Self {
        let mut hits = matches.into_iter();
        Self {
            top: hits.next(),
            next: hits.next(),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.top.is_none()
    }

    /// Number of products carried into the prompt
    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.top.is_some()) + usize::from(self.next.is_some())
    }

    /// Render the assistant-context block describing the retrieved products
    #[must_use]
    pub fn render(&self) -> String {
        let Some(top) = &self.top else {
            return "The product search did not return any matching products. \
                    Do not invent products; ask the customer for more details about what they need."
                .to_string();
        };

        let mut out = format!(
            "Here is the top product that the user is interested in, based on the semantic search results:\n\
             Top product name: {}\n\
             Top product description: {}\n\
             Top product price: {}\n",
            top.name, top.description, top.price
        );

        if let Some(next) = &self.next {
            out.push_str(&format!(
                "\nHere is one other product that the user might be interested in:\n\
                 Next product name: {}\n\
                 Next product description: {}\n\
                 Next product price: {}\n",
                next.name, next.description, next.price
            ));
        }

        out
    }
}
